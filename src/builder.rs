//! 叶子节点和复合节点的类型化构建函数
//!
//! 每个构建函数都会校验参数，要么返回完全合法的值，要么返回错误，
//! 不存在构建了一半的过滤器。
//!
//! ```text
//! Filter::by_id / by_type / by_amount
//!   ├─ 操作符：解析原始输入              → InvalidOperator
//!   ├─ 操作符：该字段是否支持            → OperatorNotSupported
//!   ├─ 值：业务约束                      → InvalidValue
//!   └─ Filter::from_leaf：叶子已设置？   → EmptyLeafValue
//!
//! Filter::new(op, left, right)
//!   ├─ op：And / Or？                    → InvalidLogicalOperator
//!   ├─ left 非空？                       → EmptyNode { side: Left }
//!   └─ right 非空？                      → EmptyNode { side: Right }
//! ```

use tracing::debug;
use uuid::Uuid;

use crate::ast::{Filter, FilterLeaf, IdLeaf, NumberLeaf, PaymentLeaf, TextLeaf};
use crate::error::{FilterError, Result, Side};
use crate::token::{CmpOp, LogicalOp};

/// 过滤器唯一允许比较的支付类型
pub const PAYMENT_TYPE: &str = "Payment";

fn parse_cmp<C>(cmp: C) -> Result<CmpOp>
where
    C: TryInto<CmpOp>,
    C::Error: Into<FilterError>,
{
    cmp.try_into().map_err(|e| {
        let err: FilterError = e.into();
        debug!(error = %err, "rejected filter comparison operator");
        err
    })
}

fn parse_logical<O>(op: O) -> Result<LogicalOp>
where
    O: TryInto<LogicalOp>,
    O::Error: Into<FilterError>,
{
    op.try_into().map_err(|e| {
        let err: FilterError = e.into();
        debug!(error = %err, "rejected filter logical operator");
        err
    })
}

fn not_supported(op: CmpOp, kind: &'static str) -> FilterError {
    debug!(%op, kind, "comparison operator not supported for leaf");
    FilterError::OperatorNotSupported { op, kind }
}

impl IdLeaf {
    pub fn new<C>(cmp: C, val: Uuid) -> Result<Self>
    where
        C: TryInto<CmpOp>,
        C::Error: Into<FilterError>,
    {
        let op = parse_cmp(cmp)?;
        match op {
            CmpOp::Equal | CmpOp::NotEqual => Ok(Self { cmp: Some(op), val }),
            _ => Err(not_supported(op, "identifier")),
        }
    }
}

impl TextLeaf {
    pub fn new<C>(cmp: C, val: impl Into<String>) -> Result<Self>
    where
        C: TryInto<CmpOp>,
        C::Error: Into<FilterError>,
    {
        let op = parse_cmp(cmp)?;
        Ok(Self {
            cmp: Some(op),
            val: val.into(),
        })
    }
}

impl NumberLeaf {
    pub fn new<C>(cmp: C, val: f64) -> Result<Self>
    where
        C: TryInto<CmpOp>,
        C::Error: Into<FilterError>,
    {
        let op = parse_cmp(cmp)?;
        if op == CmpOp::Match {
            return Err(not_supported(op, "numeric"));
        }

        Ok(Self { cmp: Some(op), val })
    }
}

impl<L: FilterLeaf> Filter<L> {
    /// 把 `leaf` 包装成叶子节点，叶子未设置时返回 `EmptyLeafValue`
    pub fn from_leaf(leaf: L) -> Result<Self> {
        match leaf.op() {
            Some(op) if leaf.is_set() => Ok(Filter::leaf_node(op, leaf)),
            _ => {
                debug!("rejected unset filter leaf");
                Err(FilterError::EmptyLeafValue)
            }
        }
    }
}

impl<L> Filter<L> {
    /// 用 `op` 连接 `left` 和 `right`，构建复合节点
    ///
    /// 两侧都不能是空过滤器。
    pub fn new<O>(op: O, left: Filter<L>, right: Filter<L>) -> Result<Self>
    where
        O: TryInto<LogicalOp>,
        O::Error: Into<FilterError>,
    {
        let op = parse_logical(op)?;

        if left.is_empty() {
            debug!(side = %Side::Left, "rejected empty filter node");
            return Err(FilterError::EmptyNode { side: Side::Left });
        }

        if right.is_empty() {
            debug!(side = %Side::Right, "rejected empty filter node");
            return Err(FilterError::EmptyNode { side: Side::Right });
        }

        Ok(Filter::composite_node(op, left, right))
    }

    pub fn and(left: Filter<L>, right: Filter<L>) -> Result<Self> {
        Filter::new(LogicalOp::And, left, right)
    }

    pub fn or(left: Filter<L>, right: Filter<L>) -> Result<Self> {
        Filter::new(LogicalOp::Or, left, right)
    }
}

impl Filter<PaymentLeaf> {
    /// 按 ID 过滤支付的叶子，只支持 `Equal` 和 `NotEqual`
    pub fn by_id<C>(cmp: C, val: Uuid) -> Result<Self>
    where
        C: TryInto<CmpOp>,
        C::Error: Into<FilterError>,
    {
        Filter::from_leaf(PaymentLeaf::Id(IdLeaf::new(cmp, val)?))
    }

    /// 按类型过滤支付的叶子，只支持 `Equal` 和 `NotEqual`，值必须是 [`PAYMENT_TYPE`]
    pub fn by_type<C>(cmp: C, val: impl Into<String>) -> Result<Self>
    where
        C: TryInto<CmpOp>,
        C::Error: Into<FilterError>,
    {
        let op = parse_cmp(cmp)?;
        if !matches!(op, CmpOp::Equal | CmpOp::NotEqual) {
            return Err(not_supported(op, "type"));
        }

        let leaf = TextLeaf::new(op, val)?;
        if leaf.text() != PAYMENT_TYPE {
            debug!(value = leaf.text(), "rejected payment type filter value");
            return Err(FilterError::InvalidValue {
                field: "type",
                value: leaf.val,
            });
        }

        Filter::from_leaf(PaymentLeaf::Type(leaf))
    }

    /// 按金额过滤支付的叶子，不支持 `Match`
    pub fn by_amount<C>(cmp: C, val: f64) -> Result<Self>
    where
        C: TryInto<CmpOp>,
        C::Error: Into<FilterError>,
    {
        Filter::from_leaf(PaymentLeaf::Amount(NumberLeaf::new(cmp, val)?))
    }
}
