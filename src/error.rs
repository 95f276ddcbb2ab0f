use std::fmt;

use thiserror::Error;

use crate::token::CmpOp;

/// 参数对应复合节点的哪一侧
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

/// 构建过滤器时返回的错误，编译过滤器本身不会失败
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("filter comparison operator doesn't exist: {0}")]
    InvalidOperator(String),

    #[error("filter comparison operator {op} isn't supported for {kind} leaf nodes")]
    OperatorNotSupported { op: CmpOp, kind: &'static str },

    #[error("filter leaf node is invalid because its value isn't set")]
    EmptyLeafValue,

    #[error("filter logical operator doesn't exist: {0}")]
    InvalidLogicalOperator(String),

    #[error("filter {side} node cannot be empty")]
    EmptyNode { side: Side },

    #[error("invalid filter value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
