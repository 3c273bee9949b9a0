//! Domain engine: accounts, transactions and the balance synchronization
//! that keeps them consistent.

pub use accounts::Account;
pub use balance::{BalanceDelta, BalancePlan, Contribution, ContributionPatch};
pub use categories::Category;
pub use commands::{
    CreateAccountCmd, CreateCategoryCmd, CreateTransactionCmd, UpdateAccountCmd,
    UpdateCategoryCmd, UpdateTransactionCmd,
};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{
    AccountBalance, DEFAULT_LIMIT, DEFAULT_PAGE, DashboardSummary, Engine, EngineBuilder,
    MAX_LIMIT, TransactionListFilter, TransactionListItem, TransactionPage,
};
pub use tags::Tag;
pub use transactions::{Transaction, TransactionKind};
pub use users::User;

pub mod balance;

mod accounts;
mod categories;
mod commands;
mod error;
mod money;
mod ops;
mod tags;
mod transaction_tags;
mod transactions;
mod users;

type ResultEngine<T> = Result<T, EngineError>;
