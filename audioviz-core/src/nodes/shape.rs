//! Reshaping nodes: slicing, mirroring, rotation, folding and resampling.

use crate::array::Array;
use crate::graph::{Computation, Node, NodeRef, Pure};
use crate::kernels;
use crate::Result;

/// `input[start:stop]`; an absent bound means the array edge.
pub struct Slice {
    input: Node<Array>,
    start: Option<Node<isize>>,
    stop: Option<Node<isize>>,
}

impl Slice {
    pub fn node(
        input: &Node<Array>,
        start: Option<&Node<isize>>,
        stop: Option<&Node<isize>>,
    ) -> Result<Node<Array>> {
        Node::new(Self {
            input: input.clone(),
            start: start.cloned(),
            stop: stop.cloned(),
        })
    }
}

impl Computation for Slice {
    type Output = Array;

    fn compute(&mut self) -> Array {
        let start = self.start.as_ref().map(Node::value);
        let stop = self.stop.as_ref().map(Node::value);
        kernels::slice(&self.input.value(), start, stop).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        let mut inputs = vec![self.input.erased().clone()];
        inputs.extend(self.start.iter().map(|n| n.erased().clone()));
        inputs.extend(self.stop.iter().map(|n| n.erased().clone()));
        inputs
    }
}

impl Pure for Slice {}

/// The input joined with its own reverse.
pub struct Mirror {
    input: Node<Array>,
    right_side: Node<bool>,
}

impl Mirror {
    pub fn node(input: &Node<Array>, right_side: &Node<bool>) -> Result<Node<Array>> {
        Node::new(Self {
            input: input.clone(),
            right_side: right_side.clone(),
        })
    }
}

impl Computation for Mirror {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::mirror(&self.input.value(), self.right_side.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.erased().clone(), self.right_side.erased().clone()]
    }
}

impl Pure for Mirror {}

pub struct Roll {
    input: Node<Array>,
    amount: Node<isize>,
}

impl Roll {
    pub fn node(input: &Node<Array>, amount: &Node<isize>) -> Result<Node<Array>> {
        Node::new(Self {
            input: input.clone(),
            amount: amount.clone(),
        })
    }
}

impl Computation for Roll {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::roll(&self.input.value(), self.amount.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.erased().clone(), self.amount.erased().clone()]
    }
}

impl Pure for Roll {}

/// Column-wise maximum over rows of `width`.
pub struct FoldMax {
    input: Node<Array>,
    width: Node<usize>,
}

impl FoldMax {
    pub fn node(input: &Node<Array>, width: &Node<usize>) -> Result<Node<Array>> {
        Node::new(Self {
            input: input.clone(),
            width: width.clone(),
        })
    }
}

impl Computation for FoldMax {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::fold_max(&self.input.value(), self.width.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.erased().clone(), self.width.erased().clone()]
    }
}

impl Pure for FoldMax {}

/// Maximum of `y` in each bucket between consecutive `points` of `x`.
pub struct Resample {
    x: Node<Array>,
    y: Node<Array>,
    points: Node<Array>,
}

impl Resample {
    pub fn node(x: &Node<Array>, y: &Node<Array>, points: &Node<Array>) -> Result<Node<Array>> {
        Node::new(Self {
            x: x.clone(),
            y: y.clone(),
            points: points.clone(),
        })
    }
}

impl Computation for Resample {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::resample(&self.x.value(), &self.y.value(), &self.points.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![
            self.x.erased().clone(),
            self.y.erased().clone(),
            self.points.erased().clone(),
        ]
    }
}

impl Pure for Resample {}

/// Linear interpolation of the table `(xp, fp)` at `x`.
pub struct Interpolate {
    x: Node<Array>,
    xp: Node<Array>,
    fp: Node<Array>,
}

impl Interpolate {
    pub fn node(x: &Node<Array>, xp: &Node<Array>, fp: &Node<Array>) -> Result<Node<Array>> {
        Node::new(Self {
            x: x.clone(),
            xp: xp.clone(),
            fp: fp.clone(),
        })
    }
}

impl Computation for Interpolate {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::interp(&self.x.value(), &self.xp.value(), &self.fp.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![
            self.x.erased().clone(),
            self.xp.erased().clone(),
            self.fp.erased().clone(),
        ]
    }
}

impl Pure for Interpolate {}
