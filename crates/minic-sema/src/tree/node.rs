//! Arena-based parse tree

/// Index of a node in a [`ParseTree`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Grammar productions of the MiniC language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Program,
    DefineHeader,
    FuncDef,
    FuncArgDec,
    DeclList,
    DeclInit,
    AssignStmt,
    /// Arithmetic expression (`al_expr` in the grammar)
    ArithExpr,
    /// Relational or logical expression (`rel_expr`)
    RelExpr,
    IncExpr,
    Variable,
    Clause,
    Body,
    BodyList,
    Value,
    Number,
    Statement,
    InitStmt,
    UpdateStmt,
    TestExpr,
    Type,
    ContinueStmt,
}

/// Terminal leaves carried by the parse tree
///
/// Lexemes are kept only where the analyzer (or a human reading a dump)
/// needs them; punctuation is positional and carries none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Ident(String),
    /// Decimal integer literal
    Num(String),
    /// Binary integer literal (`0b...`)
    NumBin(String),
    /// Hex integer literal (`0x...`)
    NumHex(String),
    Void,
    Int,
    Float,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    /// Any operator: `=`, `+`, `*`, `<=`, `&&`, `++`, ...
    Op(String),
    /// Non-type keyword: `define`, `for`, `while`, `if`, ...
    Keyword(String),
}

/// Label of a parse node: an inner production or a terminal leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeLabel {
    Production(Production),
    Terminal(Terminal),
}

#[derive(Debug, Clone)]
struct ParseNode {
    label: NodeLabel,
    children: Vec<NodeId>,
}

/// An ordered, labeled parse tree, read-only during analysis
///
/// A node's former first-child/next-sibling chain is exactly its `children`
/// slice visited in order, so the recursive child-then-sibling traversal of
/// the analyses becomes a plain loop over `children`.
#[derive(Debug, Clone, Default)]
pub struct ParseTree {
    nodes: Vec<ParseNode>,
    root: Option<NodeId>,
}

impl ParseTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a production node with the given ordered children
    pub fn production(&mut self, production: Production, children: Vec<NodeId>) -> NodeId {
        self.push(NodeLabel::Production(production), children)
    }

    /// Add a terminal leaf
    pub fn terminal(&mut self, terminal: Terminal) -> NodeId {
        self.push(NodeLabel::Terminal(terminal), Vec::new())
    }

    fn push(&mut self, label: NodeLabel, children: Vec<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(ParseNode { label, children });
        id
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn label(&self, id: NodeId) -> &NodeLabel {
        &self.nodes[id.index()].label
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// The node's production, if it is not a terminal
    pub fn production_of(&self, id: NodeId) -> Option<Production> {
        match self.label(id) {
            NodeLabel::Production(p) => Some(*p),
            NodeLabel::Terminal(_) => None,
        }
    }

    /// The node's terminal, if it is a leaf
    pub fn terminal_of(&self, id: NodeId) -> Option<&Terminal> {
        match self.label(id) {
            NodeLabel::Terminal(t) => Some(t),
            NodeLabel::Production(_) => None,
        }
    }

    pub fn is_production(&self, id: NodeId, production: Production) -> bool {
        self.production_of(id) == Some(production)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
