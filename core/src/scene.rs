use std::rc::Rc;

use crate::image::BaseImage;
use crate::viewport::Viewport;
use crate::{Color, Point, Stroke};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    Full,
    MaskOnly,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Background { color: Color },
    Image { image: Rc<BaseImage> },
    Polyline {
        points: Vec<Point>,
        color: Color,
        width: f32,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneNode {
    pub kind: NodeKind,
    /// Dropped from masks.
    pub excludable: bool,
}

/// Display list in paint order, sized to the viewport it was composed for.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    viewport: Viewport,
    nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn without_excludable(&self) -> Scene {
        Scene {
            viewport: self.viewport,
            nodes: self
                .nodes
                .iter()
                .filter(|node| !node.excludable)
                .cloned()
                .collect(),
        }
    }
}

pub fn compose(
    base: Option<&Rc<BaseImage>>,
    background: Color,
    strokes: &[Stroke],
    viewport: Viewport,
    mode: RenderMode,
) -> Scene {
    let mut nodes = Vec::with_capacity(strokes.len() + 2);
    nodes.push(SceneNode {
        kind: NodeKind::Background { color: background },
        excludable: false,
    });
    if let (RenderMode::Full, Some(image)) = (mode, base) {
        nodes.push(SceneNode {
            kind: NodeKind::Image {
                image: Rc::clone(image),
            },
            excludable: true,
        });
    }
    for stroke in strokes {
        if stroke.points.is_empty() {
            continue;
        }
        nodes.push(SceneNode {
            kind: NodeKind::Polyline {
                points: stroke.points.clone(),
                color: stroke.color,
                width: stroke.stroke_width,
            },
            excludable: false,
        });
    }
    Scene { viewport, nodes }
}
