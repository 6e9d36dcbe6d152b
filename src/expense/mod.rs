//! Expense records and the endpoints for managing them.

mod create;
mod date_range;
mod db;
mod delete;
mod domain;
mod edit;
mod list;

pub use create::create_expense_endpoint;
pub use date_range::{DateRange, DateRangeQuery};
pub use db::{
    create_expense, create_expense_table, delete_expense, get_expense, get_expenses,
    update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{
    DEFAULT_EXPENSE_TYPE, Expense, ExpenseData, ExpenseId, ExpenseTitle, NewExpense,
    parse_expense_id,
};
pub use edit::update_expense_endpoint;
pub use list::list_expenses_endpoint;
