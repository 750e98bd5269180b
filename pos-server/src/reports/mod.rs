//! 报表模块 - 日销售汇总、日损益、支出周期汇总、CSV 导出
//!
//! 纯计算函数，数据由 handler 查询后传入。

pub mod export;
pub mod summary;

pub use export::{export_filename, write_sales_csv};
pub use summary::{
    DailyProfit, ExpensePeriod, ProductSales, SalesSummary, SalesTotals, daily_profit,
    expense_period, sales_summary,
};
