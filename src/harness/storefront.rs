//! The acceptance suite for the storefront.
//!
//! One parameterised definition covers every deployment: the base URL, the
//! catalog item and the product fixture all come from [`Config`].

use std::time::Duration;

use crate::browser::Locator;
use crate::config::Config;

use super::admin::{AdminState, AdminWorkflow, Credentials};
use super::markup::{self, routes};
use super::scenario::{Assertion, Expected, Probe, Scenario, Step};
use super::types::HarnessResult;
use super::wait::Condition;

/// Credentials that must never open the admin portal
pub const INVALID_USERNAME: &str = "notTerry";
pub const INVALID_PASSWORD: &str = "notmypassword";

/// Body text of the About Us block fixture
pub const CONTENT_DESCRIPTION: &str = "About Us block created by the acceptance suite.";

/// Locators of a deletable table row
#[derive(Debug, Clone)]
struct Fixture {
    rows: Locator,
    delete: Locator,
    /// Delete asks for confirmation through a dialog
    confirm: bool,
}

impl Fixture {
    fn product(title: &str) -> Self {
        Self {
            rows: markup::product_row(title),
            delete: markup::product_delete(title),
            confirm: true,
        }
    }

    fn content_block(title: &str) -> Self {
        Self {
            rows: markup::content_block_row(title),
            delete: markup::content_block_delete(title),
            confirm: false,
        }
    }
}

/// Builds the scenario catalog for one configuration
#[derive(Debug, Clone)]
pub struct StorefrontSuite {
    config: Config,
    admin: AdminWorkflow,
}

impl StorefrontSuite {
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            admin: AdminWorkflow::from_config(config),
        }
    }

    fn short(&self) -> Duration {
        self.config.browser.short_timeout
    }

    fn long(&self) -> Duration {
        self.config.browser.long_timeout
    }

    /// Every scenario, in run order
    pub fn scenarios(&self) -> HarnessResult<Vec<Scenario>> {
        Ok(vec![
            self.home_title(),
            self.shop_link(),
            self.product_card(),
            self.add_to_cart(),
            self.add_to_cart_twice(),
            self.cart_idempotence(),
            self.invalid_admin_login()?,
            self.admin_login()?,
            self.admin_sub_page(AdminState::ShopManagement)?,
            self.admin_sub_page(AdminState::ContentManagement)?,
            self.admin_sub_page(AdminState::ClientManagement)?,
            self.back_button(AdminState::ClientManagement, AdminState::AdminPortal)?,
            self.back_button(AdminState::ApplicationResults, AdminState::ClientManagement)?,
            self.back_button(AdminState::EnergyLeakResults, AdminState::ClientManagement)?,
            self.back_button(AdminState::AddClient, AdminState::AdminPortal)?,
            self.product_round_trip()?,
            self.purge_fixture()?,
            self.content_block_round_trip()?,
        ])
    }

    pub fn home_title(&self) -> Scenario {
        Scenario::new("home_title", "The home page carries the storefront title")
            .step(Step::navigate(routes::HOME))
            .step(Step::Assert(Assertion::TitleEquals(markup::HOME_TITLE.to_string())))
    }

    pub fn shop_link(&self) -> Scenario {
        Scenario::new("shop_link", "The Shop link leads to the catalog")
            .step(Step::navigate(routes::HOME))
            .step(Step::click(markup::shop_link(), self.long()))
            .step(Step::wait_for(Condition::url_contains(routes::SHOP), self.short()))
    }

    pub fn product_card(&self) -> Scenario {
        let slug = &self.config.fixtures.catalog_slug;
        Scenario::new("product_card", "A product card opens the item's detail page")
            .step(Step::navigate(routes::SHOP))
            .step(Step::click(markup::shop_card(), self.long()))
            .step(Step::wait_for(Condition::url_contains(format!("/{}", slug)), self.short()))
    }

    pub fn add_to_cart(&self) -> Scenario {
        Scenario::new("add_to_cart", "Add to Cart lands on the cart page")
            .step(Step::navigate(routes::product(&self.config.fixtures.catalog_slug)))
            .step(Step::click(markup::add_to_cart_button(), self.long()))
            .step(Step::wait_for(Condition::url_contains(routes::CART), self.short()))
    }

    /// Two adds raise the quantity by exactly two over the baseline
    pub fn add_to_cart_twice(&self) -> Scenario {
        let product = routes::product(&self.config.fixtures.catalog_slug);
        let quantity = Probe::Quantity(markup::cart_quantity(&self.config.fixtures.catalog_item));

        let mut scenario = Scenario::new("add_to_cart_twice", "Cart quantity grows by one per add")
            .step(Step::navigate(routes::CART))
            .step(Step::measure("quantity_before", quantity.clone(), self.short()));
        for _ in 0..2 {
            scenario = scenario
                .step(Step::navigate(product.as_str()))
                .step(Step::click(markup::add_to_cart_button(), self.long()))
                .step(Step::wait_for(Condition::url_contains(routes::CART), self.short()));
        }
        scenario.step(Step::await_value(
            quantity,
            Expected::Relative {
                key: "quantity_before".to_string(),
                delta: 2,
            },
            self.short(),
        ))
    }

    /// Reading the cart twice without adding shows the same quantity
    pub fn cart_idempotence(&self) -> Scenario {
        let quantity = Probe::Quantity(markup::cart_quantity(&self.config.fixtures.catalog_item));
        Scenario::new("cart_idempotence", "Reloading the cart does not change quantities")
            .step(Step::navigate(routes::product(&self.config.fixtures.catalog_slug)))
            .step(Step::click(markup::add_to_cart_button(), self.long()))
            .step(Step::wait_for(Condition::url_contains(routes::CART), self.short()))
            .step(Step::measure("first_read", quantity.clone(), self.short()))
            .step(Step::navigate(routes::CART))
            .step(Step::measure("second_read", quantity, self.short()))
            .step(Step::Assert(Assertion::ValueEquals {
                key: "second_read".to_string(),
                expected: Expected::Relative {
                    key: "first_read".to_string(),
                    delta: 0,
                },
            }))
    }

    pub fn invalid_admin_login(&self) -> HarnessResult<Scenario> {
        let bad = Credentials::new(INVALID_USERNAME, INVALID_PASSWORD);
        Ok(Scenario::new(
            "invalid_admin_login",
            "Wrong credentials keep the session on the login page",
        )
        .steps(self.admin.reach(AdminState::AdminLoginPage)?)
        .steps(self.admin.login_attempt(&bad))
        .step(Step::Assert(Assertion::UrlContains(routes::USER_LOGIN.to_string())))
        .step(Step::Assert(Assertion::UrlExcludes(routes::ADMIN_PORTAL.to_string()))))
    }

    pub fn admin_login(&self) -> HarnessResult<Scenario> {
        Ok(
            Scenario::new("admin_login", "Valid credentials open the admin portal")
                .steps(self.admin.reach(AdminState::AdminPortal)?),
        )
    }

    pub fn admin_sub_page(&self, page: AdminState) -> HarnessResult<Scenario> {
        Ok(Scenario::new(
            format!("admin_{}", page.to_string().replace('-', "_")),
            format!("The {} page is reachable through the portal", page),
        )
        .steps(self.admin.reach(page)?))
    }

    /// The back control of `page` returns to `parent`
    pub fn back_button(&self, page: AdminState, parent: AdminState) -> HarnessResult<Scenario> {
        Ok(Scenario::new(
            format!("{}_back", page.to_string().replace('-', "_")),
            format!("The back control on {} returns to {}", page, parent),
        )
        .steps(self.admin.reach(page)?)
        .steps(self.admin.steps(page, parent)?)
        .step(Step::Assert(Assertion::UrlContains(parent.route().to_string()))))
    }

    /// Create the fixture, see it listed, delete it, see it gone
    pub fn product_round_trip(&self) -> HarnessResult<Scenario> {
        let fixtures = &self.config.fixtures;
        let title = fixtures.product_title.as_str();
        let fixture = Fixture::product(title);
        let rows = Probe::Count(fixture.rows.clone());
        let price = fixtures.product_price.to_string();
        let stock = fixtures.product_stock.to_string();

        let mut form = vec![
            Step::click(markup::new_product_link(), self.short()),
            Step::wait_for(Condition::url_contains(routes::NEW_PRODUCT), self.long()),
            Step::type_text(markup::product_title_field(), title, self.short()),
            Step::type_text(markup::product_price_field(), price, self.short()),
            Step::type_text(markup::product_stock_field(), stock, self.short()),
        ];
        form.extend(self.image_upload(markup::product_image_field()));
        form.push(Step::submit(markup::product_submit(), self.short()));
        form.push(Step::wait_for(
            Condition::url_contains(routes::SHOP_MANAGEMENT),
            self.long(),
        ));

        Ok(Scenario::new(
            "product_round_trip",
            format!("Product '{}' can be created and deleted from shop management", title),
        )
        .steps(self.admin.reach(AdminState::ShopManagement)?)
        .step(Step::measure("rows_before_create", rows.clone(), self.short()))
        .steps(form)
        .step(Step::await_value(
            rows,
            Expected::Relative {
                key: "rows_before_create".to_string(),
                delta: 1,
            },
            self.long(),
        ))
        .step(Step::wait_for(Condition::visible(fixture.rows.clone()), self.short()))
        .steps(self.delete_one(&fixture, "rows_before_delete"))
        .cleanup(self.admin.reach(AdminState::ShopManagement)?)
        .cleanup(self.purge_steps(&fixture)))
    }

    /// Remove a leftover fixture; finishes at once when there is none
    pub fn purge_fixture(&self) -> HarnessResult<Scenario> {
        let title = self.config.fixtures.product_title.as_str();
        Ok(Scenario::new(
            "purge_fixture",
            format!("No product named '{}' is left behind", title),
        )
        .steps(self.admin.reach(AdminState::ShopManagement)?)
        .steps(self.purge_steps(&Fixture::product(title))))
    }

    /// Add an About Us block inside the editor frame, see it listed, delete it
    pub fn content_block_round_trip(&self) -> HarnessResult<Scenario> {
        let title = self.config.fixtures.content_title.as_str();
        let fixture = Fixture::content_block(title);
        let rows = Probe::Count(fixture.rows.clone());

        let mut form = vec![
            Step::type_text(markup::content_block_title_field(), title, self.short()),
            Step::type_text(
                markup::content_block_description_field(),
                CONTENT_DESCRIPTION,
                self.short(),
            ),
        ];
        form.extend(self.image_upload(markup::content_block_image_field()));
        form.push(Step::submit(markup::content_block_submit(), self.short()));

        Ok(Scenario::new(
            "content_block_round_trip",
            format!("About Us block '{}' can be added and deleted", title),
        )
        .steps(self.about_editor()?)
        .step(Step::measure("blocks_before_create", rows.clone(), self.short()))
        .steps(form)
        .step(Step::await_value(
            rows,
            Expected::Relative {
                key: "blocks_before_create".to_string(),
                delta: 1,
            },
            self.long(),
        ))
        .steps(self.delete_one(&fixture, "blocks_before_delete"))
        .step(Step::LeaveFrame)
        .cleanup(self.about_editor()?)
        .cleanup(self.purge_steps(&fixture)))
    }

    /// Walk to content management and step into the About Us editor frame
    fn about_editor(&self) -> HarnessResult<Vec<Step>> {
        let mut steps = self.admin.reach(AdminState::ContentManagement)?;
        steps.extend([
            Step::click(markup::about_tab(), self.short()),
            Step::wait_for(Condition::visible(markup::about_panel()), self.short()),
            Step::enter_frame(markup::about_frame(), self.long()),
            Step::wait_for(Condition::visible(markup::about_header()), self.long()),
        ]);
        Ok(steps)
    }

    fn image_upload(&self, field: Locator) -> Option<Step> {
        let image = self.config.fixtures.product_image.as_ref()?;
        Some(Step::type_text(field, image.display().to_string(), self.short()))
    }

    fn delete_one(&self, fixture: &Fixture, key: &str) -> Vec<Step> {
        let rows = Probe::Count(fixture.rows.clone());
        let mut steps = vec![
            Step::measure(key, rows.clone(), self.short()),
            Step::click(fixture.delete.clone(), self.short()),
        ];
        if fixture.confirm {
            steps.push(Step::AcceptAlert {
                timeout: self.short(),
            });
        }
        steps.push(Step::await_value(
            rows,
            Expected::Relative {
                key: key.to_string(),
                delta: -1,
            },
            self.long(),
        ));
        steps
    }

    /// Delete one matching row if any exists. Expects the page listing the rows.
    fn purge_steps(&self, fixture: &Fixture) -> Vec<Step> {
        let mut steps = vec![
            Step::measure("leftover", Probe::Count(fixture.rows.clone()), self.short()),
            Step::FinishIfZero {
                key: "leftover".to_string(),
                absent: fixture.rows.clone(),
            },
        ];
        steps.extend(self.delete_one(fixture, "leftover"));
        steps
    }
}
