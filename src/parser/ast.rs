// AST (Abstract Syntax Tree) definitions for the script subset

use serde::Serialize;
use std::sync::Arc;

/// Source location of a node: start line/column plus the character range it spans.
///
/// Lines are 1-based, columns are 0-based, and `start`/`end` are character
/// offsets into the source text (`end` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
    pub start: usize,
    pub end: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, start: usize, end: usize) -> Self {
        Self {
            line,
            column,
            start,
            end,
        }
    }

    /// A location starting where `self` starts and ending where `other` ends
    pub fn to(self, other: SourceLocation) -> Self {
        Self {
            end: other.end.max(self.start),
            ..self
        }
    }
}

/// Declaration keyword of a variable binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VarKind {
    Var,
    Let,
    Const,
}

impl VarKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            VarKind::Var => "var",
            VarKind::Let => "let",
            VarKind::Const => "const",
        }
    }
}

/// Binary operators (arithmetic, comparison, bitwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
    // Comparison
    Lt,
    Gt,
    Le,
    Ge,
    LooseEq,
    StrictEq,
    LooseNe,
    StrictNe,
    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
    UShr,
}

impl BinOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Exp => "**",
            BinOp::Lt => "<",
            BinOp::Gt => ">",
            BinOp::Le => "<=",
            BinOp::Ge => ">=",
            BinOp::LooseEq => "==",
            BinOp::StrictEq => "===",
            BinOp::LooseNe => "!=",
            BinOp::StrictNe => "!==",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::UShr => ">>>",
        }
    }
}

/// Short-circuiting operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Nullish,
}

impl LogicalOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
            LogicalOp::Nullish => "??",
        }
    }
}

/// `=` or a compound assignment such as `+=`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Compound(BinOp),
}

impl AssignOp {
    pub fn symbol(&self) -> String {
        match self {
            AssignOp::Assign => "=".to_string(),
            AssignOp::Compound(op) => format!("{}=", op.symbol()),
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,    // !x
    Neg,    // -x
    Plus,   // +x
    BitNot, // ~x
    Typeof, // typeof x
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitNot => "~",
            UnaryOp::Typeof => "typeof ",
        }
    }
}

/// `++` / `--`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOp {
    Increment,
    Decrement,
}

impl UpdateOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
        }
    }
}

/// Function parameter with an optional default value
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub default: Option<Expression>,
}

/// Body of a function: a statement block, or a bare expression for arrows
#[derive(Debug, Clone)]
pub enum FunctionBody {
    Block(Vec<Statement>),
    Expression(Box<Expression>),
}

/// A function declaration, function expression, or arrow function.
///
/// Shared behind an `Arc` so function values can reference their body without
/// copying the subtree.
#[derive(Debug, Clone)]
pub struct FunctionNode {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub is_arrow: bool,
    pub is_async: bool,
    pub location: SourceLocation,
    pub body_location: SourceLocation,
}

/// One `name = init` entry of a variable declaration
#[derive(Debug, Clone)]
pub struct VarDeclarator {
    pub name: String,
    pub init: Option<Expression>,
    pub location: SourceLocation,
}

/// `catch (param) { body }`
#[derive(Debug, Clone)]
pub struct CatchClause {
    pub param: Option<String>,
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

/// Property of an object literal
#[derive(Debug, Clone)]
pub struct Property {
    pub key: String,
    pub value: Expression,
    pub location: SourceLocation,
}

/// `.name` or `[expr]`
#[derive(Debug, Clone)]
pub enum MemberProperty {
    Named(String),
    Computed(Box<Expression>),
}

/// Statements
#[derive(Debug, Clone)]
pub enum Statement {
    VarDecl {
        kind: VarKind,
        declarations: Vec<VarDeclarator>,
        location: SourceLocation,
    },
    FunctionDecl {
        function: Arc<FunctionNode>,
        location: SourceLocation,
    },
    Expression {
        expr: Expression,
        location: SourceLocation,
    },
    Return {
        argument: Option<Expression>,
        location: SourceLocation,
    },
    If {
        test: Expression,
        consequent: Box<Statement>,
        alternate: Option<Box<Statement>>,
        location: SourceLocation,
    },
    For {
        init: Option<Box<Statement>>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Box<Statement>,
        location: SourceLocation,
    },
    ForOf {
        kind: VarKind,
        binding: String,
        iterable: Expression,
        body: Box<Statement>,
        location: SourceLocation,
    },
    While {
        test: Expression,
        body: Box<Statement>,
        location: SourceLocation,
    },
    DoWhile {
        body: Box<Statement>,
        test: Expression,
        location: SourceLocation,
    },
    Break {
        location: SourceLocation,
    },
    Continue {
        location: SourceLocation,
    },
    Throw {
        argument: Expression,
        location: SourceLocation,
    },
    Block {
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Try {
        block: Vec<Statement>,
        handler: Option<CatchClause>,
        finalizer: Option<Vec<Statement>>,
        location: SourceLocation,
    },
    Empty {
        location: SourceLocation,
    },
}

impl Statement {
    /// Get the source location of this statement
    pub fn location(&self) -> SourceLocation {
        match self {
            Statement::VarDecl { location, .. }
            | Statement::FunctionDecl { location, .. }
            | Statement::Expression { location, .. }
            | Statement::Return { location, .. }
            | Statement::If { location, .. }
            | Statement::For { location, .. }
            | Statement::ForOf { location, .. }
            | Statement::While { location, .. }
            | Statement::DoWhile { location, .. }
            | Statement::Break { location }
            | Statement::Continue { location }
            | Statement::Throw { location, .. }
            | Statement::Block { location, .. }
            | Statement::Try { location, .. }
            | Statement::Empty { location } => *location,
        }
    }
}

/// Expressions
#[derive(Debug, Clone)]
pub enum Expression {
    Number {
        value: f64,
        location: SourceLocation,
    },
    String {
        value: String,
        location: SourceLocation,
    },
    Boolean {
        value: bool,
        location: SourceLocation,
    },
    Null {
        location: SourceLocation,
    },
    Template {
        quasis: Vec<String>,
        expressions: Vec<Expression>,
        location: SourceLocation,
    },
    Identifier {
        name: String,
        location: SourceLocation,
    },
    This {
        location: SourceLocation,
    },
    Array {
        elements: Vec<Option<Expression>>,
        location: SourceLocation,
    },
    Object {
        properties: Vec<Property>,
        location: SourceLocation,
    },
    Function {
        function: Arc<FunctionNode>,
        location: SourceLocation,
    },
    Unary {
        op: UnaryOp,
        argument: Box<Expression>,
        location: SourceLocation,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        argument: Box<Expression>,
        location: SourceLocation,
    },
    Binary {
        op: BinOp,
        left: Box<Expression>,
        right: Box<Expression>,
        location: SourceLocation,
    },
    Logical {
        op: LogicalOp,
        left: Box<Expression>,
        right: Box<Expression>,
        location: SourceLocation,
    },
    Assign {
        op: AssignOp,
        target: Box<Expression>,
        value: Box<Expression>,
        location: SourceLocation,
    },
    Conditional {
        test: Box<Expression>,
        consequent: Box<Expression>,
        alternate: Box<Expression>,
        location: SourceLocation,
    },
    Call {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        location: SourceLocation,
    },
    New {
        callee: Box<Expression>,
        arguments: Vec<Expression>,
        location: SourceLocation,
    },
    Member {
        object: Box<Expression>,
        property: MemberProperty,
        location: SourceLocation,
    },
    Await {
        argument: Box<Expression>,
        location: SourceLocation,
    },
}

impl Expression {
    /// Get the source location of this expression
    pub fn location(&self) -> SourceLocation {
        match self {
            Expression::Number { location, .. }
            | Expression::String { location, .. }
            | Expression::Boolean { location, .. }
            | Expression::Null { location }
            | Expression::Template { location, .. }
            | Expression::Identifier { location, .. }
            | Expression::This { location }
            | Expression::Array { location, .. }
            | Expression::Object { location, .. }
            | Expression::Function { location, .. }
            | Expression::Unary { location, .. }
            | Expression::Update { location, .. }
            | Expression::Binary { location, .. }
            | Expression::Logical { location, .. }
            | Expression::Assign { location, .. }
            | Expression::Conditional { location, .. }
            | Expression::Call { location, .. }
            | Expression::New { location, .. }
            | Expression::Member { location, .. }
            | Expression::Await { location, .. } => *location,
        }
    }

    /// Name of a bare identifier expression
    pub fn as_identifier(&self) -> Option<&str> {
        match self {
            Expression::Identifier { name, .. } => Some(name),
            _ => None,
        }
    }

    /// `(object_name, property_name)` for a non-computed `a.b` member expression
    pub fn as_static_member(&self) -> Option<(&str, &str)> {
        match self {
            Expression::Member {
                object,
                property: MemberProperty::Named(prop),
                ..
            } => object.as_identifier().map(|obj| (obj, prop.as_str())),
            _ => None,
        }
    }

    /// The function node of a function expression or arrow function
    pub fn as_function(&self) -> Option<&Arc<FunctionNode>> {
        match self {
            Expression::Function { function, .. } => Some(function),
            _ => None,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub body: Vec<Statement>,
    pub location: SourceLocation,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
