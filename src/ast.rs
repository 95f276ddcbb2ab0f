//! 过滤器树：叶子值、支付叶子类型以及二叉过滤器节点

use std::fmt;
use std::mem;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::token::{CmpOp, LogicalOp};

/// 与字段比较的值，使用占位符编译时作为绑定参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    /// 空值，方言可以特殊处理（例如 SQL 的 `IS NULL`）
    Null,
    Id(Uuid),
    Text(String),
    Number(f64),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Id(id) => write!(f, "'{}'", id),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::Id(id)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// 可以作为 [`Filter`] 叶子的类型
///
/// 带有比较操作符的叶子才算已设置，只有已设置的叶子能包装成过滤器节点。
pub trait FilterLeaf {
    /// 比较操作符，未设置时为 `None`
    fn op(&self) -> Option<CmpOp>;

    /// 与字段比较的值
    fn value(&self) -> Value;

    fn is_set(&self) -> bool {
        self.op().is_some()
    }
}

/// 比较唯一标识的叶子，只允许 `Equal` 和 `NotEqual`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IdLeaf {
    pub(crate) cmp: Option<CmpOp>,
    pub(crate) val: Uuid,
}

impl FilterLeaf for IdLeaf {
    fn op(&self) -> Option<CmpOp> {
        self.cmp
    }

    fn value(&self) -> Value {
        Value::Id(self.val)
    }
}

/// 比较字符串的叶子，允许所有操作符
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextLeaf {
    pub(crate) cmp: Option<CmpOp>,
    pub(crate) val: String,
}

impl TextLeaf {
    pub fn text(&self) -> &str {
        &self.val
    }
}

impl FilterLeaf for TextLeaf {
    fn op(&self) -> Option<CmpOp> {
        self.cmp
    }

    fn value(&self) -> Value {
        Value::Text(self.val.clone())
    }
}

/// 比较浮点数的叶子，除 `Match` 外都允许
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NumberLeaf {
    pub(crate) cmp: Option<CmpOp>,
    pub(crate) val: f64,
}

impl FilterLeaf for NumberLeaf {
    fn op(&self) -> Option<CmpOp> {
        self.cmp
    }

    fn value(&self) -> Value {
        Value::Number(self.val)
    }
}

/// 过滤器可以比较的支付字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentField {
    Id,
    Type,
    Amount,
}

impl PaymentField {
    pub fn name(self) -> &'static str {
        match self {
            PaymentField::Id => "id",
            PaymentField::Type => "type",
            PaymentField::Amount => "amount",
        }
    }
}

/// 支付过滤器的叶子类型
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentLeaf {
    Id(IdLeaf),
    Type(TextLeaf),
    Amount(NumberLeaf),
}

impl PaymentLeaf {
    pub fn field(&self) -> PaymentField {
        match self {
            PaymentLeaf::Id(_) => PaymentField::Id,
            PaymentLeaf::Type(_) => PaymentField::Type,
            PaymentLeaf::Amount(_) => PaymentField::Amount,
        }
    }
}

impl FilterLeaf for PaymentLeaf {
    fn op(&self) -> Option<CmpOp> {
        match self {
            PaymentLeaf::Id(l) => l.op(),
            PaymentLeaf::Type(l) => l.op(),
            PaymentLeaf::Amount(l) => l.op(),
        }
    }

    fn value(&self) -> Value {
        match self {
            PaymentLeaf::Id(l) => l.value(),
            PaymentLeaf::Type(l) => l.value(),
            PaymentLeaf::Amount(l) => l.value(),
        }
    }
}

/// 过滤器节点的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Empty,
    Leaf,
    Composite,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node<L> {
    Empty,
    Leaf {
        op: CmpOp,
        leaf: L,
    },
    // 两个子节点都不为空，构建时已检查
    Composite {
        op: LogicalOp,
        left: Arc<Filter<L>>,
        right: Arc<Filter<L>>,
    },
}

/// 以二叉树表示的布尔谓词
///
/// 叶子节点保存一个比较；复合节点保存逻辑操作符和两个非空子节点。
/// 空节点只作为默认值出现，表示"不过滤"。
///
/// 节点构建后不可变，克隆之间只读共享子节点，所以克隆子树的开销很小。
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<L = PaymentLeaf> {
    node: Node<L>,
}

impl<L> Default for Filter<L> {
    fn default() -> Self {
        Self { node: Node::Empty }
    }
}

impl<L> Filter<L> {
    pub(crate) fn leaf_node(op: CmpOp, leaf: L) -> Self {
        Self {
            node: Node::Leaf { op, leaf },
        }
    }

    pub(crate) fn composite_node(op: LogicalOp, left: Filter<L>, right: Filter<L>) -> Self {
        Self {
            node: Node::Composite {
                op,
                left: Arc::new(left),
                right: Arc::new(right),
            },
        }
    }

    pub(crate) fn node(&self) -> &Node<L> {
        &self.node
    }

    pub fn kind(&self) -> FilterKind {
        match self.node {
            Node::Empty => FilterKind::Empty,
            Node::Leaf { .. } => FilterKind::Leaf,
            Node::Composite { .. } => FilterKind::Composite,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind() == FilterKind::Empty
    }

    /// 叶子节点的叶子值
    pub fn as_leaf(&self) -> Option<&L> {
        match &self.node {
            Node::Leaf { leaf, .. } => Some(leaf),
            _ => None,
        }
    }

    /// 复合节点的逻辑操作符和两个子节点
    ///
    /// 返回的子节点是独立的值，对它们的任何操作都不会影响当前过滤器。
    pub fn as_composite(&self) -> Option<(LogicalOp, Filter<L>, Filter<L>)>
    where
        L: Clone,
    {
        match &self.node {
            Node::Composite { op, left, right } => {
                Some((*op, (**left).clone(), (**right).clone()))
            }
            _ => None,
        }
    }

    /// 树中叶子的数量
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];

        while let Some(f) = stack.pop() {
            match &f.node {
                Node::Empty => {}
                Node::Leaf { .. } => count += 1,
                Node::Composite { left, right, .. } => {
                    stack.push(&**left);
                    stack.push(&**right);
                }
            }
        }

        count
    }
}

// 逐层释放子节点，深度很大的树也不会栈溢出
impl<L> Drop for Filter<L> {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        if let Node::Composite { left, right, .. } = mem::replace(&mut self.node, Node::Empty) {
            pending.push(left);
            pending.push(right);
        }

        while let Some(child) = pending.pop() {
            // 仍被其他克隆共享的子树留给最后的持有者释放
            if let Ok(mut f) = Arc::try_unwrap(child) {
                if let Node::Composite { left, right, .. } = mem::replace(&mut f.node, Node::Empty) {
                    pending.push(left);
                    pending.push(right);
                }
            }
        }
    }
}
