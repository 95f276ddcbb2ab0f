//! 通用过滤器编译器
//!
//! 将 [`Filter`] 渲染为中缀文本表达式。目标语言的词汇由 [`Dialect`] 提供：
//! 叶子字段的名称、比较操作符的写法以及逻辑操作符的写法。
//!
//! 按中序遍历（左、操作符、右）。除了传入编译调用的根节点外，每个复合节点
//! 都会加上括号，这样树的分组在展开成文本后仍然保留。

use std::ptr;

use tracing::trace;

use crate::ast::{Filter, FilterLeaf, Node, Value};
use crate::token::{CmpOp, LogicalOp};

/// 比较操作符针对某个值的渲染结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmpToken {
    pub token: String,
    /// 操作符本身已包含值（例如 `IS NULL`），后面不再跟值或占位符
    pub self_contained: bool,
}

impl CmpToken {
    pub fn operator(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            self_contained: false,
        }
    }

    pub fn self_contained(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            self_contained: true,
        }
    }
}

impl From<(String, bool)> for CmpToken {
    fn from((token, self_contained): (String, bool)) -> Self {
        Self {
            token,
            self_contained,
        }
    }
}

/// 目标查询语言的词汇
///
/// 每个过滤器的使用方（例如某个数据库后端）提供自己的实现。
pub trait Dialect<L> {
    /// `leaf` 比较的字段名
    fn leaf_field(&self, leaf: &L) -> String;

    /// 与 `value` 比较时 `op` 的写法
    ///
    /// 有的语言会根据值改变操作符：SQL 与 `NULL` 比较时用 `IS NULL` 而不是 `= NULL`。
    fn compare_token(&self, op: CmpOp, value: &Value) -> CmpToken;

    fn logical_token(&self, op: LogicalOp) -> String;
}

/// 由三个闭包组成的 [`Dialect`]
pub struct Callbacks<F, C, G> {
    leaf_field: F,
    compare_token: C,
    logical_token: G,
}

impl<F, C, G> Callbacks<F, C, G> {
    pub fn new(leaf_field: F, compare_token: C, logical_token: G) -> Self {
        Self {
            leaf_field,
            compare_token,
            logical_token,
        }
    }
}

impl<L, F, C, G> Dialect<L> for Callbacks<F, C, G>
where
    F: Fn(&L) -> String,
    C: Fn(CmpOp, &Value) -> (String, bool),
    G: Fn(LogicalOp) -> String,
{
    fn leaf_field(&self, leaf: &L) -> String {
        (self.leaf_field)(leaf)
    }

    fn compare_token(&self, op: CmpOp, value: &Value) -> CmpToken {
        (self.compare_token)(op, value).into()
    }

    fn logical_token(&self, op: LogicalOp) -> String {
        (self.logical_token)(op)
    }
}

/// 把只渲染操作符的闭包包装成比较回调，该回调从不返回自包含的操作符
pub fn no_value<F>(f: F) -> impl Fn(CmpOp, &Value) -> (String, bool)
where
    F: Fn(CmpOp) -> String,
{
    move |op, _: &Value| (f(op), false)
}

/// 渲染 `filter`，所有值以字面量内联
///
/// 用于诊断和可读输出；构建可执行查询请使用 [`render_with_placeholders`]。
pub fn render<L, D>(filter: &Filter<L>, dialect: &D) -> String
where
    L: FilterLeaf,
    D: Dialect<L> + ?Sized,
{
    let s = Stringify {
        dialect,
        root: filter,
    };

    s.literal()
}

/// 渲染 `filter`，每个值替换为 `placeholder`，并按占位符出现的顺序返回这些值
///
/// 例如表示 `id = 10` 的过滤器，占位符为 `"?"` 时结果是 `("id = ?", [10])`。
pub fn render_with_placeholders<L, D>(
    filter: &Filter<L>,
    placeholder: &str,
    dialect: &D,
) -> (String, Vec<Value>)
where
    L: FilterLeaf,
    D: Dialect<L> + ?Sized,
{
    let s = Stringify {
        dialect,
        root: filter,
    };

    let mut values = Vec::new();
    let rendered = s.placeholders(placeholder, &mut values);
    trace!(
        leaves = filter.leaf_count(),
        values = values.len(),
        "compiled filter"
    );

    (rendered, values)
}

struct Stringify<'a, L, D: ?Sized> {
    dialect: &'a D,
    root: &'a Filter<L>,
}

enum Frame<'a, L> {
    Visit(&'a Filter<L>),
    Logical(LogicalOp),
    Close,
}

impl<'a, L, D> Stringify<'a, L, D>
where
    L: FilterLeaf,
    D: Dialect<L> + ?Sized,
{
    fn literal(&self) -> String {
        self.walk(|out, value| out.push_str(&value.to_string()))
    }

    fn placeholders(&self, ph: &str, values: &mut Vec<Value>) -> String {
        self.walk(|out, value| {
            out.push_str(ph);
            values.push(value);
        })
    }

    // 中序遍历，用显式栈代替递归，输出写入同一个缓冲区。
    // `emit_value` 负责写出非自包含比较的值部分。
    fn walk<E>(&self, mut emit_value: E) -> String
    where
        E: FnMut(&mut String, Value),
    {
        let mut out = String::new();
        let mut stack = vec![Frame::Visit(self.root)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Visit(f) => match f.node() {
                    Node::Empty => {}
                    Node::Leaf { op, leaf } => {
                        let value = leaf.value();
                        let cmp = self.dialect.compare_token(*op, &value);
                        out.push_str(&self.dialect.leaf_field(leaf));
                        out.push(' ');
                        out.push_str(&cmp.token);
                        if !cmp.self_contained {
                            out.push(' ');
                            emit_value(&mut out, value);
                        }
                    }
                    Node::Composite { op, left, right } => {
                        // 按地址判断根节点：与根相等的子树仍然是嵌套表达式
                        if !ptr::eq(f, self.root) {
                            out.push('(');
                            stack.push(Frame::Close);
                        }
                        stack.push(Frame::Visit(&**right));
                        stack.push(Frame::Logical(*op));
                        stack.push(Frame::Visit(&**left));
                    }
                },
                Frame::Logical(op) => {
                    out.push(' ');
                    out.push_str(&self.dialect.logical_token(op));
                    out.push(' ');
                }
                Frame::Close => out.push(')'),
            }
        }

        out
    }
}
