//! 支付过滤表达式：二叉过滤器树、支付字段的类型化构建函数，
//! 以及可渲染到任意查询语言的编译器

pub mod ast;
pub mod builder;
pub mod compiler;
pub mod config;
pub mod error;
pub mod sql_compiler;
pub mod token;

pub use ast::{
    Filter, FilterKind, FilterLeaf, IdLeaf, NumberLeaf, PaymentField, PaymentLeaf, TextLeaf,
    Value,
};
pub use builder::PAYMENT_TYPE;
pub use compiler::{render, render_with_placeholders, Callbacks, CmpToken, Dialect};
pub use config::ColumnMapping;
pub use error::{FilterError, Result, Side};
pub use sql_compiler::SqlCompiler;
pub use token::{CmpOp, LogicalOp};
