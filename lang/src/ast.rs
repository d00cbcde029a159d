// lang/src/ast.rs
// Formula tree stored as an arena; children always precede their parent.

use std::fmt;

pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Var {
    X,
    Y,
}

impl Var {
    pub fn name(self) -> &'static str {
        match self {
            Var::X => "x",
            Var::Y => "y",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Pow => "**",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Var(Var),
    Literal(f64),
    Binary { op: BinOp, left: NodeId, right: NodeId },
}

/// Immutable parsed formula.
///
/// Built once by the parser and only read afterwards. Every operation on the
/// tree walks it with an explicit stack, so evaluation cost never depends on
/// the call stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    nodes: Vec<Node>,
    root: NodeId,
    source: String,
}

impl Formula {
    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId, source: String) -> Self {
        Self { nodes, root, source }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Text the formula was parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Node ids of the subtree under `id` in post-order (children first).
    pub fn postorder_from(&self, id: NodeId) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![(id, false)];
        while let Some((current, expanded)) = stack.pop() {
            match self.nodes[current] {
                Node::Binary { left, right, .. } if !expanded => {
                    stack.push((current, true));
                    stack.push((right, false));
                    stack.push((left, false));
                }
                _ => order.push(current),
            }
        }
        order
    }

    pub fn postorder(&self) -> Vec<NodeId> {
        self.postorder_from(self.root)
    }

    /// Longest root-to-leaf path, counting nodes.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        for id in self.postorder() {
            depths[id] = match self.nodes[id] {
                Node::Binary { left, right, .. } => 1 + depths[left].max(depths[right]),
                _ => 1,
            };
        }
        depths[self.root]
    }

    pub fn contains_variable(&self, id: NodeId) -> bool {
        self.postorder_from(id)
            .into_iter()
            .any(|n| matches!(self.nodes[n], Node::Var(_)))
    }

    /// Renders the subtree under `id` back to formula text with minimal
    /// parentheses.
    pub fn render(&self, id: NodeId) -> String {
        self.render_prec(id, 0)
    }

    fn render_prec(&self, id: NodeId, parent_prec: u8) -> String {
        let (text, prec) = match self.nodes[id] {
            Node::Var(var) => (var.name().to_string(), ATOM),
            Node::Literal(value) if value < 0.0 => (format!("-{}", -value), NEG),
            Node::Literal(value) => (value.to_string(), ATOM),
            Node::Binary { op: BinOp::Mul, left, right } if self.is_neg_one(left) => {
                (format!("-{}", self.render_prec(right, NEG)), NEG)
            }
            Node::Binary { op, left, right } => {
                let prec = binary_prec(op);
                // `**` is right associative and its right operand may be negated
                let (left_prec, right_prec, spaced) = match op {
                    BinOp::Add | BinOp::Sub => (prec, prec + 1, true),
                    BinOp::Mul | BinOp::Div => (prec, NEG, false),
                    BinOp::Pow => (prec + 1, NEG, false),
                };
                let l = self.render_prec(left, left_prec);
                let r = self.render_prec(right, right_prec);
                let text = if spaced {
                    format!("{} {} {}", l, op.symbol(), r)
                } else {
                    format!("{}{}{}", l, op.symbol(), r)
                };
                (text, prec)
            }
        };
        if prec < parent_prec {
            format!("({})", text)
        } else {
            text
        }
    }

    fn is_neg_one(&self, id: NodeId) -> bool {
        matches!(self.nodes[id], Node::Literal(v) if v == -1.0)
    }
}

const NEG: u8 = 3;
const ATOM: u8 = 5;

fn binary_prec(op: BinOp) -> u8 {
    match op {
        BinOp::Add | BinOp::Sub => 1,
        BinOp::Mul | BinOp::Div => 2,
        BinOp::Pow => 4,
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render(self.root))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // x + y*2
    fn sample() -> Formula {
        let nodes = vec![
            Node::Var(Var::X),
            Node::Var(Var::Y),
            Node::Literal(2.0),
            Node::Binary { op: BinOp::Mul, left: 1, right: 2 },
            Node::Binary { op: BinOp::Add, left: 0, right: 3 },
        ];
        Formula::from_parts(nodes, 4, "x + y*2".to_string())
    }

    #[test]
    fn postorder_visits_children_first() {
        assert_eq!(sample().postorder(), vec![0, 1, 2, 3, 4]);
        assert_eq!(sample().postorder_from(3), vec![1, 2, 3]);
    }

    #[test]
    fn depth_counts_nodes_on_longest_path() {
        assert_eq!(sample().depth(), 3);
    }

    #[test]
    fn render_drops_redundant_parentheses() {
        let formula = sample();
        assert_eq!(formula.to_string(), "x + y*2");
        assert_eq!(formula.render(3), "y*2");
    }

    #[test]
    fn negation_renders_with_leading_minus() {
        let nodes = vec![
            Node::Literal(-1.0),
            Node::Var(Var::X),
            Node::Var(Var::Y),
            Node::Binary { op: BinOp::Add, left: 1, right: 2 },
            Node::Binary { op: BinOp::Mul, left: 0, right: 3 },
        ];
        let formula = Formula::from_parts(nodes, 4, "-(x+y)".to_string());
        assert_eq!(formula.to_string(), "-(x + y)");
    }

    #[test]
    fn variable_detection_is_per_subtree() {
        let formula = sample();
        assert!(formula.contains_variable(3));
        assert!(!formula.contains_variable(2));
    }
}
