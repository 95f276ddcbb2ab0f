//! 过滤器语言的操作符定义

use std::convert::Infallible;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// 叶子节点对字段使用的比较操作符
///
/// 没有"未设置"变体：未指定操作符的叶子保存 `None`，因此编译器永远不会遇到未设置的操作符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CmpOp {
    Equal,          // =
    NotEqual,       // !=
    GreaterThan,    // >
    GreaterOrEqual, // >=
    LessThan,       // <
    LessOrEqual,    // <=
    Match,          // LIKE
}

impl CmpOp {
    pub const ALL: [CmpOp; 7] = [
        CmpOp::Equal,
        CmpOp::NotEqual,
        CmpOp::GreaterThan,
        CmpOp::GreaterOrEqual,
        CmpOp::LessThan,
        CmpOp::LessOrEqual,
        CmpOp::Match,
    ];

    /// 操作符的数字编码，0 保留给"未设置"
    pub fn code(self) -> u8 {
        match self {
            CmpOp::Equal => 1,
            CmpOp::NotEqual => 2,
            CmpOp::GreaterThan => 3,
            CmpOp::GreaterOrEqual => 4,
            CmpOp::LessThan => 5,
            CmpOp::LessOrEqual => 6,
            CmpOp::Match => 7,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CmpOp::Equal => "=",
            CmpOp::NotEqual => "!=",
            CmpOp::GreaterThan => ">",
            CmpOp::GreaterOrEqual => ">=",
            CmpOp::LessThan => "<",
            CmpOp::LessOrEqual => "<=",
            CmpOp::Match => "MATCH",
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<u8> for CmpOp {
    type Error = FilterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        CmpOp::ALL
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or_else(|| FilterError::InvalidOperator(code.to_string()))
    }
}

impl<'a> TryFrom<&'a str> for CmpOp {
    type Error = FilterError;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        let op = match s.trim().to_ascii_uppercase().as_str() {
            "=" | "==" => CmpOp::Equal,
            "!=" | "<>" => CmpOp::NotEqual,
            ">" => CmpOp::GreaterThan,
            ">=" => CmpOp::GreaterOrEqual,
            "<" => CmpOp::LessThan,
            "<=" => CmpOp::LessOrEqual,
            "LIKE" | "MATCH" => CmpOp::Match,
            _ => return Err(FilterError::InvalidOperator(s.to_string())),
        };

        Ok(op)
    }
}

/// 连接复合节点左右子节点的逻辑操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// 逻辑操作符的数字编码，0 同样保留给"未设置"
    pub fn code(self) -> u8 {
        match self {
            LogicalOp::And => 1,
            LogicalOp::Or => 2,
        }
    }
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => f.write_str("AND"),
            LogicalOp::Or => f.write_str("OR"),
        }
    }
}

impl TryFrom<u8> for LogicalOp {
    type Error = FilterError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        [LogicalOp::And, LogicalOp::Or]
            .into_iter()
            .find(|op| op.code() == code)
            .ok_or_else(|| FilterError::InvalidLogicalOperator(code.to_string()))
    }
}

impl<'a> TryFrom<&'a str> for LogicalOp {
    type Error = FilterError;

    fn try_from(s: &'a str) -> Result<Self, Self::Error> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" | "&&" => Ok(LogicalOp::And),
            "OR" | "||" => Ok(LogicalOp::Or),
            _ => Err(FilterError::InvalidLogicalOperator(s.to_string())),
        }
    }
}

// 构建函数既可以直接接收操作符，也可以接收原始编码或文本
impl From<Infallible> for FilterError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
