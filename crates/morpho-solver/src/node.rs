//! Scene nodes.
//!
//! A node either owns a soft body or stands in for a child node. Callers
//! reach the body through [`SceneNode::as_deformable`] instead of checking
//! node types at run time.

use morpho_types::{MorphoError, MorphoResult};

use crate::engine::SoftBody;
use crate::report::TickReport;

/// A node in a scene hierarchy.
#[derive(Debug)]
pub enum SceneNode {
    /// Owns a simulated body.
    Leaf(Box<SoftBody>),
    /// Forwards to a child node.
    Proxy(Box<SceneNode>),
    /// No deformable content (e.g. a placeholder before a model is loaded).
    Empty,
}

impl SceneNode {
    pub fn leaf(body: SoftBody) -> Self {
        Self::Leaf(Box::new(body))
    }

    pub fn proxy(child: SceneNode) -> Self {
        Self::Proxy(Box::new(child))
    }

    /// The body at the end of the proxy chain, if any.
    pub fn as_deformable(&self) -> Option<&SoftBody> {
        match self {
            Self::Leaf(body) => Some(&**body),
            Self::Proxy(child) => child.as_deformable(),
            Self::Empty => None,
        }
    }

    pub fn as_deformable_mut(&mut self) -> Option<&mut SoftBody> {
        match self {
            Self::Leaf(body) => Some(&mut **body),
            Self::Proxy(child) => child.as_deformable_mut(),
            Self::Empty => None,
        }
    }

    /// Like [`as_deformable_mut`](Self::as_deformable_mut), but an empty
    /// chain is an error.
    pub fn require_deformable(&mut self) -> MorphoResult<&mut SoftBody> {
        self.as_deformable_mut().ok_or(MorphoError::NotInitialized)
    }

    /// Tick the body behind this node. `None` when there is none.
    pub fn tick(&mut self) -> Option<TickReport> {
        self.as_deformable_mut().map(SoftBody::tick)
    }

    /// Number of proxies between this node and its content.
    pub fn depth(&self) -> usize {
        match self {
            Self::Proxy(child) => 1 + child.depth(),
            _ => 0,
        }
    }
}
