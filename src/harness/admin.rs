//! Admin workflow state machine.
//!
//! ```text
//! Anonymous -> UserLoginPage -> AdminLoginPage -> AdminPortal -> ShopManagement
//!                                                             -> ContentManagement
//!                                                             -> ClientManagement
//! ClientManagement -> ApplicationResults | EnergyLeakResults | AddClient
//! ClientManagement -> AdminPortal              (back button)
//! ApplicationResults | EnergyLeakResults -> ClientManagement   (back link)
//! AddClient -> AdminPortal                     (back link)
//! ```
//!
//! Every edge is crossed by activating an element on the current page. The
//! only navigation is entering the application at its root, so a scenario can
//! never land on a protected page without walking the login path first.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::Duration;

use crate::browser::Locator;
use crate::config::Config;

use super::markup::{self, routes};
use super::scenario::Step;
use super::types::{HarnessError, HarnessResult};
use super::wait::Condition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminState {
    Anonymous,
    UserLoginPage,
    AdminLoginPage,
    AdminPortal,
    ShopManagement,
    ContentManagement,
    ClientManagement,
    ApplicationResults,
    EnergyLeakResults,
    AddClient,
}

/// How an edge of the state machine is crossed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Click(Locator),
    /// Submit the admin login form with the configured credentials
    Login,
}

impl AdminState {
    pub const ALL: [AdminState; 10] = [
        AdminState::Anonymous,
        AdminState::UserLoginPage,
        AdminState::AdminLoginPage,
        AdminState::AdminPortal,
        AdminState::ShopManagement,
        AdminState::ContentManagement,
        AdminState::ClientManagement,
        AdminState::ApplicationResults,
        AdminState::EnergyLeakResults,
        AdminState::AddClient,
    ];

    /// Outgoing edges of this state
    pub fn transitions(self) -> Vec<(AdminState, Transition)> {
        use AdminState::*;
        match self {
            Anonymous => vec![(UserLoginPage, Transition::Click(markup::login_button()))],
            UserLoginPage => vec![(AdminLoginPage, Transition::Click(markup::admin_login_link()))],
            AdminLoginPage => vec![(AdminPortal, Transition::Login)],
            AdminPortal => vec![
                (ShopManagement, Transition::Click(markup::shop_management_link())),
                (ContentManagement, Transition::Click(markup::content_management_link())),
                (ClientManagement, Transition::Click(markup::client_management_link())),
            ],
            ClientManagement => vec![
                (ApplicationResults, Transition::Click(markup::application_results_link())),
                (EnergyLeakResults, Transition::Click(markup::energy_leak_results_link())),
                (AddClient, Transition::Click(markup::add_client_link())),
                (AdminPortal, Transition::Click(markup::back_to_portal_button())),
            ],
            ApplicationResults | EnergyLeakResults => {
                vec![(ClientManagement, Transition::Click(markup::back_page_link()))]
            }
            AddClient => vec![(AdminPortal, Transition::Click(markup::add_client_back_link()))],
            ShopManagement | ContentManagement => Vec::new(),
        }
    }

    /// States reachable in one transition
    pub fn successors(self) -> Vec<AdminState> {
        self.transitions().into_iter().map(|(state, _)| state).collect()
    }

    /// Route of the page of this state
    pub fn route(self) -> &'static str {
        use AdminState::*;
        match self {
            Anonymous => routes::HOME,
            UserLoginPage => routes::USER_LOGIN,
            AdminLoginPage => routes::ADMIN_LOGIN,
            AdminPortal => routes::ADMIN_PORTAL,
            ShopManagement => routes::SHOP_MANAGEMENT,
            ContentManagement => routes::CONTENT_MANAGEMENT,
            ClientManagement => routes::CLIENT_MANAGEMENT,
            ApplicationResults => routes::APPLICATION_RESULTS,
            EnergyLeakResults => routes::ENERGY_LEAK_RESULTS,
            AddClient => routes::ADD_CLIENT,
        }
    }

    /// Condition that holds once the page of this state has loaded.
    ///
    /// Client management is a route prefix of its own sub-pages, so leaving a
    /// sub-page is only visible as an exact path match.
    pub fn arrival(self) -> Condition {
        match self {
            AdminState::ClientManagement => Condition::path_is(self.route()),
            _ => Condition::url_contains(self.route()),
        }
    }

    /// States visited on the shortest walk from `self` to `target`, excluding `self`
    pub fn path_to(self, target: AdminState) -> HarnessResult<Vec<AdminState>> {
        let mut came_from: HashMap<AdminState, AdminState> = HashMap::new();
        let mut queue = VecDeque::from([self]);
        while let Some(state) = queue.pop_front() {
            if state == target {
                break;
            }
            for next in state.successors() {
                if next != self && !came_from.contains_key(&next) {
                    came_from.insert(next, state);
                    queue.push_back(next);
                }
            }
        }

        let mut path = Vec::new();
        let mut cursor = target;
        while cursor != self {
            path.push(cursor);
            cursor = *came_from.get(&cursor).ok_or_else(|| HarnessError::InvalidTransition {
                from: self.to_string(),
                to: target.to_string(),
            })?;
        }
        path.reverse();
        Ok(path)
    }
}

impl fmt::Display for AdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AdminState::Anonymous => "anonymous",
            AdminState::UserLoginPage => "user-login-page",
            AdminState::AdminLoginPage => "admin-login-page",
            AdminState::AdminPortal => "authenticated-admin-portal",
            AdminState::ShopManagement => "shop-management",
            AdminState::ContentManagement => "content-management",
            AdminState::ClientManagement => "client-management",
            AdminState::ApplicationResults => "application-results",
            AdminState::EnergyLeakResults => "energy-leak-results",
            AdminState::AddClient => "add-client",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Builds the steps that drive a session through the admin states
#[derive(Debug, Clone)]
pub struct AdminWorkflow {
    credentials: Credentials,
    short_timeout: Duration,
    long_timeout: Duration,
}

impl AdminWorkflow {
    pub fn new(credentials: Credentials, short_timeout: Duration, long_timeout: Duration) -> Self {
        Self {
            credentials,
            short_timeout,
            long_timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Credentials::new(&config.target.admin_username, &config.target.admin_password),
            config.browser.short_timeout,
            config.browser.long_timeout,
        )
    }

    /// Steps from a fresh session to `target`
    pub fn reach(&self, target: AdminState) -> HarnessResult<Vec<Step>> {
        self.steps(AdminState::Anonymous, target)
    }

    /// Steps walking from `from` to `target`; fails when no edges lead there
    pub fn steps(&self, from: AdminState, target: AdminState) -> HarnessResult<Vec<Step>> {
        let mut steps = Vec::new();
        if from == AdminState::Anonymous {
            steps.push(Step::navigate(routes::HOME));
        }
        let mut current = from;
        for next in from.path_to(target)? {
            let transition = current
                .transitions()
                .into_iter()
                .find(|(state, _)| *state == next)
                .map(|(_, transition)| transition)
                .ok_or_else(|| HarnessError::InvalidTransition {
                    from: current.to_string(),
                    to: next.to_string(),
                })?;
            steps.extend(self.cross(current, next, transition));
            current = next;
        }
        Ok(steps)
    }

    /// Fill the admin login form and submit it, without waiting for the outcome
    pub fn login_attempt(&self, credentials: &Credentials) -> Vec<Step> {
        vec![
            Step::type_text(markup::username_field(), &credentials.username, self.long_timeout),
            Step::type_text(markup::password_field(), &credentials.password, self.short_timeout),
            Step::submit(markup::login_submit(), self.short_timeout),
        ]
    }

    fn cross(&self, from: AdminState, to: AdminState, transition: Transition) -> Vec<Step> {
        let arrived = Step::wait_for(to.arrival(), self.long_timeout);
        match transition {
            Transition::Click(link) => {
                // The first link after entering the site waits for the initial page load.
                let timeout = if from == AdminState::Anonymous {
                    self.long_timeout
                } else {
                    self.short_timeout
                };
                vec![Step::click(link, timeout), arrived]
            }
            Transition::Login => {
                let mut steps = self.login_attempt(&self.credentials);
                steps.push(arrived);
                steps
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::{MockOptions, MockStorefront};
    use crate::harness::scenario::{Assertion, Scenario, ScenarioRunner};
    use crate::harness::wait::ConditionWaiter;
    use pretty_assertions::assert_eq;

    const BASE: &str = "http://shop.test";

    fn workflow() -> AdminWorkflow {
        AdminWorkflow::new(
            Credentials::new("terry", "changeme"),
            Duration::from_millis(50),
            Duration::from_millis(100),
        )
    }

    #[test]
    fn test_path_to_sub_page_passes_through_portal() {
        let path = AdminState::Anonymous.path_to(AdminState::ClientManagement).unwrap();
        assert_eq!(
            path,
            vec![
                AdminState::UserLoginPage,
                AdminState::AdminLoginPage,
                AdminState::AdminPortal,
                AdminState::ClientManagement,
            ]
        );
        for pair in path.windows(2) {
            assert!(pair[0].successors().contains(&pair[1]));
        }
    }

    #[test]
    fn test_sideways_and_backwards_moves_are_rejected() {
        let err = AdminState::ShopManagement
            .path_to(AdminState::ContentManagement)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "no admin transition leads from shop-management to content-management"
        );
        assert!(AdminState::AdminPortal.path_to(AdminState::Anonymous).is_err());
        assert!(AdminState::AdminPortal.path_to(AdminState::UserLoginPage).is_err());
        assert!(AdminState::AdminPortal.path_to(AdminState::AdminPortal).unwrap().is_empty());
    }

    #[test]
    fn test_back_buttons_lead_out_of_client_pages() {
        assert_eq!(
            AdminState::EnergyLeakResults.path_to(AdminState::ShopManagement).unwrap(),
            vec![
                AdminState::ClientManagement,
                AdminState::AdminPortal,
                AdminState::ShopManagement,
            ]
        );
        assert_eq!(
            AdminState::AddClient.path_to(AdminState::ContentManagement).unwrap(),
            vec![AdminState::AdminPortal, AdminState::ContentManagement]
        );
        assert_eq!(
            AdminState::ApplicationResults.path_to(AdminState::AddClient).unwrap(),
            vec![AdminState::ClientManagement, AdminState::AddClient]
        );
    }

    #[test]
    fn test_back_steps_click_back_controls() {
        let steps = workflow()
            .steps(AdminState::ApplicationResults, AdminState::AdminPortal)
            .unwrap();
        assert_eq!(
            steps,
            vec![
                Step::click(markup::back_page_link(), Duration::from_millis(50)),
                Step::wait_for(
                    Condition::path_is(routes::CLIENT_MANAGEMENT),
                    Duration::from_millis(100)
                ),
                Step::click(markup::back_to_portal_button(), Duration::from_millis(50)),
                Step::wait_for(
                    Condition::url_contains(routes::ADMIN_PORTAL),
                    Duration::from_millis(100)
                ),
            ]
        );
    }

    #[test]
    fn test_only_entry_is_a_navigation() {
        let steps = workflow().reach(AdminState::ShopManagement).unwrap();
        let navigations: Vec<&Step> = steps
            .iter()
            .filter(|s| matches!(s, Step::Navigate { .. }))
            .collect();
        assert_eq!(navigations, vec![&Step::navigate(routes::HOME)]);
    }

    #[test]
    fn test_reach_every_sub_page_on_mock() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let runner = ScenarioRunner::new(Box::new(store.clone()), BASE)
            .with_waiter(ConditionWaiter::new(Duration::from_millis(2)));

        for target in AdminState::ALL {
            let scenario = Scenario::new(target.to_string(), "")
                .steps(workflow().reach(target).unwrap())
                .step(Step::Assert(Assertion::UrlContains(target.route().to_string())));
            let report = runner.run(&scenario);
            assert!(report.passed, "{}: {:?}", target, report.message);
        }
    }

    #[test]
    fn test_walk_back_through_client_pages_on_mock() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let runner = ScenarioRunner::new(Box::new(store), BASE)
            .with_waiter(ConditionWaiter::new(Duration::from_millis(2)));
        let wf = workflow();

        let scenario = Scenario::new("client_round", "")
            .steps(wf.reach(AdminState::EnergyLeakResults).unwrap())
            .steps(wf.steps(AdminState::EnergyLeakResults, AdminState::AddClient).unwrap())
            .steps(wf.steps(AdminState::AddClient, AdminState::ShopManagement).unwrap())
            .step(Step::Assert(Assertion::UrlContains(routes::SHOP_MANAGEMENT.into())));
        let report = runner.run(&scenario);
        assert!(report.passed, "{:?}", report.message);
        assert_eq!(report.steps_completed, report.steps_total);
    }

    #[test]
    fn test_wrong_credentials_stay_on_login() {
        let store = MockStorefront::new(BASE, MockOptions::default());
        let runner = ScenarioRunner::new(Box::new(store), BASE)
            .with_waiter(ConditionWaiter::new(Duration::from_millis(2)));
        let wf = workflow();

        let scenario = Scenario::new("bad_login", "")
            .steps(wf.reach(AdminState::AdminLoginPage).unwrap())
            .steps(wf.login_attempt(&Credentials::new("notTerry", "notmypassword")))
            .step(Step::Assert(Assertion::UrlContains(routes::USER_LOGIN.into())))
            .step(Step::Assert(Assertion::UrlExcludes(routes::ADMIN_PORTAL.into())));
        let report = runner.run(&scenario);
        assert!(report.passed, "{:?}", report.message);
    }
}
