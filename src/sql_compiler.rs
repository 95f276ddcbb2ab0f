//! 过滤器的 SQL 渲染，以及基于 sea-query 构建的支付表 SELECT 查询

use sea_query::{Alias, Expr, Order, Query, SelectStatement, SqliteQueryBuilder, Values};
use tracing::debug;

use crate::ast::{Filter, FilterLeaf, PaymentLeaf, Value};
use crate::compiler::{self, CmpToken, Dialect};
use crate::config::ColumnMapping;
use crate::token::{CmpOp, LogicalOp};

/// 标准 SQL 词汇，字段名由 `leaf_field` 决定
pub struct SqlDialect<F> {
    leaf_field: F,
}

impl<F> SqlDialect<F> {
    pub fn new(leaf_field: F) -> Self {
        Self { leaf_field }
    }
}

impl<L, F> Dialect<L> for SqlDialect<F>
where
    F: Fn(&L) -> String,
{
    fn leaf_field(&self, leaf: &L) -> String {
        (self.leaf_field)(leaf)
    }

    fn compare_token(&self, op: CmpOp, value: &Value) -> CmpToken {
        sql_cmp_op(op, value)
    }

    fn logical_token(&self, op: LogicalOp) -> String {
        sql_logical_op(op).to_string()
    }
}

/// 比较操作符的 SQL 写法。与 `NULL` 判断相等或不等时使用
/// `IS NULL` / `IS NOT NULL`，不再跟值。
pub fn sql_cmp_op(op: CmpOp, value: &Value) -> CmpToken {
    match op {
        CmpOp::Equal if value.is_null() => CmpToken::self_contained("IS NULL"),
        CmpOp::NotEqual if value.is_null() => CmpToken::self_contained("IS NOT NULL"),
        CmpOp::Equal => CmpToken::operator("="),
        CmpOp::NotEqual => CmpToken::operator("<>"),
        CmpOp::GreaterThan => CmpToken::operator(">"),
        CmpOp::GreaterOrEqual => CmpToken::operator(">="),
        CmpOp::LessThan => CmpToken::operator("<"),
        CmpOp::LessOrEqual => CmpToken::operator("<="),
        CmpOp::Match => CmpToken::operator("LIKE"),
    }
}

pub fn sql_logical_op(op: LogicalOp) -> &'static str {
    match op {
        LogicalOp::And => "AND",
        LogicalOp::Or => "OR",
    }
}

/// 把 `filter` 渲染为使用 `?` 占位符的标准 SQL `WHERE` 表达式，并按顺序返回绑定值
///
/// ```
/// use payment_filter::{sql_compiler::sql, CmpOp, Filter, PaymentLeaf, Value};
///
/// let f = Filter::by_amount(CmpOp::GreaterOrEqual, 10.0).unwrap();
/// let (s, values) = sql(&f, |l: &PaymentLeaf| l.field().name().to_string());
/// assert_eq!(s, "amount >= ?");
/// assert_eq!(values, vec![Value::Number(10.0)]);
/// ```
pub fn sql<L, F>(filter: &Filter<L>, leaf_field: F) -> (String, Vec<Value>)
where
    L: FilterLeaf,
    F: Fn(&L) -> String,
{
    compiler::render_with_placeholders(filter, "?", &SqlDialect::new(leaf_field))
}

impl From<Value> for sea_query::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => sea_query::Value::String(None),
            // 标识以文本形式存储
            Value::Id(id) => sea_query::Value::String(Some(Box::new(id.to_string()))),
            Value::Text(s) => sea_query::Value::String(Some(Box::new(s))),
            Value::Number(n) => sea_query::Value::Double(Some(n)),
        }
    }
}

/// 按字段排序的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Unspecified,
    Ascending,
    Descending,
}

impl SortDir {
    fn order(self) -> Option<Order> {
        match self {
            SortDir::Unspecified => None,
            SortDir::Ascending => Some(Order::Asc),
            SortDir::Descending => Some(Order::Desc),
        }
    }
}

/// 可用于排序的支付字段，按声明顺序应用
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub id: SortDir,
    pub payment_type: SortDir,
    pub version: SortDir,
    pub organisation_id: SortDir,
    pub amount: SortDir,
}

/// 分页：获取数量和起始偏移，limit 为 0 表示不分页
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Chunk {
    pub limit: u32,
    pub offset: u64,
}

/// 除 ID 外要读取的支付列，ID 总是读取
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub payment_type: bool,
    pub version: bool,
    pub organisation_id: bool,
    pub attributes: bool,
}

/// 支付列表查询请求
#[derive(Debug, Clone, Default)]
pub struct FindQuery {
    pub filter: Filter,
    pub selection: Selection,
    pub sort: Sort,
    pub chunk: Chunk,
}

/// [`FindQuery`] 的编译结果
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub sql: String,
    pub values: Values,
}

/// 构建支付表上的 SQLite 查询
#[derive(Debug, Clone, Default)]
pub struct SqlCompiler {
    mapping: ColumnMapping,
}

impl SqlCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mapping(mapping: ColumnMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    fn dialect(&self) -> SqlDialect<impl Fn(&PaymentLeaf) -> String + '_> {
        SqlDialect::new(|leaf: &PaymentLeaf| self.mapping.column(leaf.field()).to_string())
    }

    /// `filter` 的 `WHERE` 表达式及其绑定值，空过滤器返回空字符串
    pub fn where_clause(&self, filter: &Filter) -> (String, Vec<Value>) {
        compiler::render_with_placeholders(filter, "?", &self.dialect())
    }

    /// 值内联后的 `filter`，用于日志和错误信息
    pub fn describe(&self, filter: &Filter) -> String {
        compiler::render(filter, &self.dialect())
    }

    /// 构建 `query` 的 SELECT 语句
    pub fn select(&self, query: &FindQuery) -> SelectStatement {
        let m = &self.mapping;
        let mut select = Query::select();
        select.from(Alias::new(m.table.as_str()));

        select.expr(Expr::cust(m.id.as_str()));
        if query.selection.version {
            select.expr(Expr::cust(m.version.as_str()));
        }
        if query.selection.organisation_id {
            select.expr(Expr::cust(m.organisation_id.as_str()));
        }
        if query.selection.payment_type {
            select.expr_as(Expr::cust(m.payment_type.as_str()), Alias::new("type"));
        }
        if query.selection.attributes {
            select.expr(Expr::cust(m.data.as_str()));
        }

        let (where_sql, values) = self.where_clause(&query.filter);
        if !where_sql.is_empty() {
            let values: Vec<sea_query::Value> = values.into_iter().map(Into::into).collect();
            select.and_where(Expr::cust_with_values(where_sql, values));
        }

        let sort = &query.sort;
        let columns = [
            (sort.id, &m.id),
            (sort.payment_type, &m.payment_type),
            (sort.version, &m.version),
            (sort.organisation_id, &m.organisation_id),
            (sort.amount, &m.amount),
        ];
        for (dir, column) in columns {
            if let Some(order) = dir.order() {
                select.order_by_expr(Expr::cust(column.as_str()), order);
            }
        }

        if query.chunk.limit > 0 {
            select.limit(u64::from(query.chunk.limit));
            select.offset(query.chunk.offset);
        }

        select
    }

    /// 把 `query` 编译为带 `?` 占位符的 SQLite SQL 和绑定值，过滤条件的值在前
    pub fn compile(&self, query: &FindQuery) -> CompileResult {
        let (sql, values) = self.select(query).build(SqliteQueryBuilder);
        debug!(sql = %sql, values = values.0.len(), "compiled payments query");

        CompileResult { sql, values }
    }
}
