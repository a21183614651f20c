//! # Echo Core - Domain Module
//! 
//! Tenant-scoped entities plus the account types behind authentication.

#[macro_use]
mod labels;

pub mod entity;
pub mod patch;
pub mod query;

pub mod goal;
pub mod initiative;
pub mod customer;
pub mod feedback;
pub mod idea;

pub mod tenant;
pub mod user;
pub mod password_reset;
pub mod dashboard;

// Re-export all entities and enums
pub use entity::{EntityKind, TenantEntity};
pub use query::{ListQuery, SortOrder};
pub use goal::{Goal, GoalPatch, GoalStatus, NewGoal};
pub use initiative::{Initiative, InitiativePatch, InitiativeStatus, NewInitiative};
pub use customer::{Customer, CustomerPatch, CustomerStatus, NewCustomer};
pub use feedback::{Feedback, FeedbackPatch, NewFeedback, Sentiment};
pub use idea::{Idea, IdeaEffort, IdeaPatch, IdeaPriority, IdeaStatus, NewIdea};
pub use tenant::Tenant;
pub use user::{User, UserRole};
pub use password_reset::PasswordReset;
pub use dashboard::{DashboardSummary, StatusCounts};
