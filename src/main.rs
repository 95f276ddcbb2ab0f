use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use payment_filter::compiler::{self, no_value, Callbacks};
use payment_filter::sql_compiler::{Chunk, FindQuery, Selection, Sort, SortDir};
use payment_filter::{
    CmpOp, ColumnMapping, Filter, LogicalOp, PaymentLeaf, SqlCompiler, PAYMENT_TYPE,
};

fn create_compiler_with_config() -> SqlCompiler {
    SqlCompiler::with_mapping(ColumnMapping::from_json_file_or_default("column_mapping.json"))
}

fn example_filter() -> Result<Filter> {
    let id = Uuid::parse_str("86b16b89-61c1-4f2f-963b-b542e3597d69")?;

    let big_but_not_this_one = Filter::and(
        Filter::by_amount(CmpOp::GreaterOrEqual, 10.0)?,
        Filter::by_id(CmpOp::NotEqual, id)?,
    )?;
    let any_amount = Filter::or(big_but_not_this_one, Filter::by_amount("<", 8.5)?)?;
    let filter = Filter::and(any_amount, Filter::by_type(CmpOp::Equal, PAYMENT_TYPE)?)?;

    Ok(filter)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("--- Payment Filter: 过滤器编译器 ---");

    let filter = example_filter().context("构建示例过滤器失败")?;

    // 使用字段名和操作符符号的简单词汇
    let plain = Callbacks::new(
        |leaf: &PaymentLeaf| leaf.field().name().to_string(),
        no_value(|op: CmpOp| op.symbol().to_string()),
        |op: LogicalOp| op.to_string(),
    );
    println!("\n[过滤器]:\n{}", compiler::render(&filter, &plain));

    let compiler = create_compiler_with_config();
    println!("\n[SQL 字面量]:\n{}", compiler.describe(&filter));

    let (where_sql, values) = compiler.where_clause(&filter);
    println!("\n[SQL 占位符]:\n{}", where_sql);
    println!("绑定值: {}", serde_json::to_string(&values)?);

    let query = FindQuery {
        filter,
        selection: Selection {
            payment_type: true,
            version: true,
            organisation_id: true,
            attributes: false,
        },
        sort: Sort {
            amount: SortDir::Descending,
            id: SortDir::Ascending,
            ..Default::default()
        },
        chunk: Chunk {
            limit: 20,
            offset: 0,
        },
    };
    let result = compiler.compile(&query);
    println!("\n[支付查询]:\n{}", result.sql);
    println!("绑定值数量: {}", result.values.0.len());

    Ok(())
}
