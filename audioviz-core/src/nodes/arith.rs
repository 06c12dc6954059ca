//! Elementwise arithmetic and generated ranges.

use crate::array::{Array, Numeric};
use crate::graph::{Computation, Node, NodeRef, Pure};
use crate::kernels;
use crate::Result;

/// The four elementwise binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Subtract => left - right,
            BinaryOp::Multiply => left * right,
            BinaryOp::Divide => left / right,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Subtract => "Subtract",
            BinaryOp::Multiply => "Multiply",
            BinaryOp::Divide => "Divide",
        }
    }
}

/// `left <op> right`, element by element.
///
/// Division follows IEEE semantics: dividing by zero yields an infinity or
/// NaN rather than failing.
pub struct Binary<T> {
    op: BinaryOp,
    left: Node<T>,
    right: Node<T>,
}

impl<T: Numeric> Binary<T> {
    pub fn node(op: BinaryOp, left: &Node<T>, right: &Node<T>) -> Result<Node<T>> {
        Node::new(Self {
            op,
            left: left.clone(),
            right: right.clone(),
        })
    }
}

impl<T: Numeric> Computation for Binary<T> {
    type Output = T;

    fn compute(&mut self) -> T {
        let op = self.op;
        self.left
            .value()
            .zip_with(&self.right.value(), |l, r| op.apply(l, r))
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.left.erased().clone(), self.right.erased().clone()]
    }

    fn name(&self) -> &'static str {
        self.op.name()
    }
}

impl<T: Numeric> Pure for Binary<T> {}

pub fn add<T: Numeric>(left: &Node<T>, right: &Node<T>) -> Result<Node<T>> {
    Binary::node(BinaryOp::Add, left, right)
}

pub fn subtract<T: Numeric>(left: &Node<T>, right: &Node<T>) -> Result<Node<T>> {
    Binary::node(BinaryOp::Subtract, left, right)
}

pub fn multiply<T: Numeric>(left: &Node<T>, right: &Node<T>) -> Result<Node<T>> {
    Binary::node(BinaryOp::Multiply, left, right)
}

pub fn divide<T: Numeric>(left: &Node<T>, right: &Node<T>) -> Result<Node<T>> {
    Binary::node(BinaryOp::Divide, left, right)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Log2,
    Exp2,
}

/// A per-element function of one array.
pub struct Unary {
    op: UnaryOp,
    input: Node<Array>,
}

impl Unary {
    pub fn node(op: UnaryOp, input: &Node<Array>) -> Result<Node<Array>> {
        Node::new(Self {
            op,
            input: input.clone(),
        })
    }
}

impl Computation for Unary {
    type Output = Array;

    fn compute(&mut self) -> Array {
        let input = self.input.value();
        match self.op {
            UnaryOp::Log2 => input.map(f64::log2),
            UnaryOp::Exp2 => input.map(f64::exp2),
        }
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![self.input.erased().clone()]
    }

    fn name(&self) -> &'static str {
        match self.op {
            UnaryOp::Log2 => "Log2",
            UnaryOp::Exp2 => "Exp2",
        }
    }
}

impl Pure for Unary {}

pub fn log2(input: &Node<Array>) -> Result<Node<Array>> {
    Unary::node(UnaryOp::Log2, input)
}

pub fn exp2(input: &Node<Array>) -> Result<Node<Array>> {
    Unary::node(UnaryOp::Exp2, input)
}

/// `count` evenly spaced values over `[start, stop]`.
pub struct Linspace {
    start: Node<f64>,
    stop: Node<f64>,
    count: Node<usize>,
}

impl Linspace {
    pub fn node(start: &Node<f64>, stop: &Node<f64>, count: &Node<usize>) -> Result<Node<Array>> {
        Node::new(Self {
            start: start.clone(),
            stop: stop.clone(),
            count: count.clone(),
        })
    }
}

impl Computation for Linspace {
    type Output = Array;

    fn compute(&mut self) -> Array {
        kernels::linspace(self.start.value(), self.stop.value(), self.count.value()).into()
    }

    fn inputs(&self) -> Vec<NodeRef> {
        vec![
            self.start.erased().clone(),
            self.stop.erased().clone(),
            self.count.erased().clone(),
        ]
    }
}

impl Pure for Linspace {}
