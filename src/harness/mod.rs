pub mod admin;
pub mod markup;
pub mod scenario;
pub mod storefront;
pub mod types;
pub mod wait;

pub use admin::{AdminState, AdminWorkflow, Credentials, Transition};
pub use scenario::{
    Assertion, Expected, Interaction, Probe, Scenario, ScenarioContext, ScenarioReport,
    ScenarioRunner, Step, StepFlow,
};
pub use storefront::StorefrontSuite;
pub use types::{HarnessError, HarnessResult};
pub use wait::{Condition, ConditionWaiter, Resolved};
