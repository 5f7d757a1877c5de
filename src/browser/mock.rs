//! In-memory storefront for dry runs and tests.
//!
//! [`MockStorefront`] plays the application server: the product catalog is
//! shared by every session it opens. Each [`MockBrowser`] plays one browser
//! with its own cookie state (cart contents, admin login). Pages are rendered
//! from the same locators in [`crate::harness::markup`] the scenarios use.
//!
//! Eventual consistency is simulated the way the real application shows it:
//! - the admin product list keeps serving stale rows for a configurable number
//!   of reads after a create or delete
//! - the cart page is rendered at load time, so adds show up only after a reload
//! - deleting a product opens a confirmation dialog; any other command while
//!   it is open dismisses it and fails, as a W3C driver does by default
//! - the About Us editor lives in a frame inside the content management page

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::harness::markup::{self, routes};
use crate::snapshot::canvas::{encode_png, render_page};

use super::{BrowserError, BrowserResult, BrowserSession, ElementRef, Locator, SessionFactory};

/// Behaviour switches for the simulated application
#[derive(Debug, Clone)]
pub struct MockOptions {
    pub admin_username: String,
    pub admin_password: String,
    /// Title of the home page
    pub home_title: String,
    /// Stale admin-list reads served after each create or delete
    pub list_lag_reads: u32,
    /// Whether delete asks for confirmation through a dialog
    pub confirm_delete: bool,
    /// Make every screenshot request fail
    pub screenshot_error: bool,
    /// Seed catalog as (slug, title)
    pub catalog: Vec<(String, String)>,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            admin_username: crate::config::DEFAULT_ADMIN_USERNAME.to_string(),
            admin_password: crate::config::DEFAULT_ADMIN_PASSWORD.to_string(),
            home_title: markup::HOME_TITLE.to_string(),
            list_lag_reads: 2,
            confirm_delete: true,
            screenshot_error: false,
            catalog: vec![
                ("yoga".to_string(), "Yoga Lessons".to_string()),
                ("meditation".to_string(), "Guided Meditation".to_string()),
            ],
        }
    }
}

impl MockOptions {
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin_username = username.into();
        self.admin_password = password.into();
        self
    }

    pub fn list_lag(mut self, reads: u32) -> Self {
        self.list_lag_reads = reads;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Product {
    slug: String,
    title: String,
    price: String,
    stock: String,
}

/// Server-side state shared by all sessions
#[derive(Debug)]
struct Catalog {
    products: Vec<Product>,
    /// What the admin list currently renders
    listed: Vec<Product>,
    lag_remaining: u32,
    /// About Us content block titles
    blocks: Vec<String>,
}

impl Catalog {
    fn mutated(&mut self, lag: u32) {
        self.lag_remaining = lag;
        if lag == 0 {
            self.listed = self.products.clone();
        }
    }
}

/// The simulated application; opens isolated browser sessions
#[derive(Debug, Clone)]
pub struct MockStorefront {
    base_url: String,
    options: Arc<MockOptions>,
    catalog: Arc<Mutex<Catalog>>,
    opened: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
}

impl MockStorefront {
    pub fn new(base_url: impl Into<String>, options: MockOptions) -> Self {
        let products: Vec<Product> = options
            .catalog
            .iter()
            .map(|(slug, title)| Product {
                slug: slug.clone(),
                title: title.clone(),
                price: "25".to_string(),
                stock: "10".to_string(),
            })
            .collect();
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            options: Arc::new(options),
            catalog: Arc::new(Mutex::new(Catalog {
                listed: products.clone(),
                products,
                lag_remaining: 0,
                blocks: Vec::new(),
            })),
            opened: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Open a concrete session (the trait method boxes this)
    pub fn browser(&self) -> MockBrowser {
        self.opened.fetch_add(1, Ordering::SeqCst);
        MockBrowser {
            base_url: self.base_url.clone(),
            options: Arc::clone(&self.options),
            catalog: Arc::clone(&self.catalog),
            closed_counter: Arc::clone(&self.closed),
            url: "about:blank".to_string(),
            path: String::new(),
            title: String::new(),
            elements: Vec::new(),
            generation: 0,
            cart: BTreeMap::new(),
            admin: false,
            login_failed: false,
            fields: HashMap::new(),
            alert: None,
            panel_open: false,
            in_frame: false,
            closed: false,
        }
    }

    /// Number of catalog entries titled `title`, bypassing any list lag
    pub fn product_count(&self, title: &str) -> usize {
        lock(&self.catalog)
            .map(|c| c.products.iter().filter(|p| p.title == title).count())
            .unwrap_or(0)
    }

    /// Insert a product directly, as if another admin had created it
    pub fn seed_product(&self, slug: &str, title: &str) {
        if let Ok(mut catalog) = lock(&self.catalog) {
            catalog.products.push(Product {
                slug: slug.to_string(),
                title: title.to_string(),
                price: "1".to_string(),
                stock: "1".to_string(),
            });
            catalog.mutated(0);
        }
    }

    /// Number of About Us blocks titled `title`
    pub fn content_block_count(&self, title: &str) -> usize {
        lock(&self.catalog)
            .map(|c| c.blocks.iter().filter(|b| b.as_str() == title).count())
            .unwrap_or(0)
    }

    pub fn seed_content_block(&self, title: &str) {
        if let Ok(mut catalog) = lock(&self.catalog) {
            catalog.blocks.push(title.to_string());
        }
    }

    pub fn sessions_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn sessions_closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl SessionFactory for MockStorefront {
    fn open(&self) -> BrowserResult<Box<dyn BrowserSession>> {
        Ok(Box::new(self.browser()))
    }

    fn kind(&self) -> &str {
        "mock"
    }
}

fn lock(catalog: &Mutex<Catalog>) -> BrowserResult<MutexGuard<'_, Catalog>> {
    catalog
        .lock()
        .map_err(|_| BrowserError::Transport("catalog lock poisoned".to_string()))
}

/// What activating an element does
#[derive(Debug, Clone)]
enum ElementAction {
    None,
    Navigate(String),
    AddToCart(String),
    Login,
    SubmitProduct,
    Delete(String),
    RemoveProduct(String),
    OpenPanel,
    SubmitBlock,
    DeleteBlock(String),
}

#[derive(Debug, Clone)]
struct MockElement {
    tag: &'static str,
    text: String,
    classes: Vec<&'static str>,
    /// Form field this element edits
    field: Option<&'static str>,
    /// Structural locators (xpath, css, id) this element answers to
    aliases: Vec<Locator>,
    action: ElementAction,
}

impl MockElement {
    fn new(tag: &'static str, text: impl Into<String>) -> Self {
        Self {
            tag,
            text: text.into(),
            classes: Vec::new(),
            field: None,
            aliases: Vec::new(),
            action: ElementAction::None,
        }
    }

    fn link(text: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new("a", text).action(ElementAction::Navigate(path.into()))
    }

    fn input(field: &'static str) -> Self {
        let mut el = Self::new("input", "");
        el.field = Some(field);
        el
    }

    fn class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    fn alias(mut self, locator: Locator) -> Self {
        self.aliases.push(locator);
        self
    }

    fn action(mut self, action: ElementAction) -> Self {
        self.action = action;
        self
    }

    fn matches(&self, locator: &Locator) -> bool {
        match locator {
            Locator::LinkText(text) => self.tag == "a" && self.text == *text,
            Locator::ClassName(class) => self.classes.iter().any(|c| c == class),
            Locator::Name(name) => self.field == Some(name.as_str()),
            other => self.aliases.contains(other),
        }
    }
}

#[derive(Debug)]
struct PendingAlert {
    text: String,
    on_accept: ElementAction,
}

/// One simulated browser session
pub struct MockBrowser {
    base_url: String,
    options: Arc<MockOptions>,
    catalog: Arc<Mutex<Catalog>>,
    closed_counter: Arc<AtomicUsize>,
    url: String,
    path: String,
    title: String,
    elements: Vec<MockElement>,
    /// Bumped on every render; element refs from older renders are stale
    generation: u64,
    /// Cookie-scoped cart: item title -> quantity
    cart: BTreeMap<String, u32>,
    admin: bool,
    login_failed: bool,
    fields: HashMap<&'static str, String>,
    alert: Option<PendingAlert>,
    /// About Us tab expanded on the content management page
    panel_open: bool,
    /// Commands target the About Us frame instead of the top document
    in_frame: bool,
    closed: bool,
}

impl MockBrowser {
    fn ensure_open(&self) -> BrowserResult<()> {
        if self.closed {
            return Err(BrowserError::Protocol {
                error: "invalid session id".to_string(),
                message: "session has been closed".to_string(),
            });
        }
        Ok(())
    }

    /// Dismiss an open dialog and fail the command that ran into it
    fn ensure_no_alert(&mut self) -> BrowserResult<()> {
        self.ensure_open()?;
        match self.alert.take() {
            Some(alert) => Err(BrowserError::Protocol {
                error: "unexpected alert open".to_string(),
                message: format!("dismissed '{}'", alert.text),
            }),
            None => Ok(()),
        }
    }

    fn element(&self, element: &ElementRef) -> BrowserResult<&MockElement> {
        let stale = || BrowserError::StaleElement(element.0.clone());
        let (generation, index) = element.0.split_once(':').ok_or_else(stale)?;
        if generation.parse::<u64>().ok() != Some(self.generation) {
            return Err(stale());
        }
        let index: usize = index.parse().map_err(|_| stale())?;
        self.elements.get(index).ok_or_else(stale)
    }

    /// Load a route, applying the admin guard
    fn load(&mut self, path: &str) -> BrowserResult<()> {
        let path = path.split(['?', '#']).next().unwrap_or("/");
        let path = if path.is_empty() { "/" } else { path };

        let protected = path == routes::ADMIN_PORTAL
            || path.starts_with("/shop/admin")
            || path == routes::CONTENT_MANAGEMENT
            || path.starts_with(routes::CLIENT_MANAGEMENT);
        let path = if protected && !self.admin {
            routes::USER_LOGIN
        } else {
            path
        };

        self.path = path.to_string();
        self.url = format!("{}{}", self.base_url, path);
        self.fields.clear();
        self.panel_open = false;
        self.in_frame = false;
        self.render()
    }

    fn render(&mut self) -> BrowserResult<()> {
        let (title, elements) = self.page()?;
        self.title = title;
        self.elements = elements;
        self.generation += 1;
        Ok(())
    }

    fn page(&self) -> BrowserResult<(String, Vec<MockElement>)> {
        let catalog = lock(&self.catalog)?;
        let site = &self.options.home_title;
        let path = self.path.as_str();

        let page = match path {
            routes::HOME => (
                site.clone(),
                vec![
                    MockElement::link("Shop", routes::SHOP),
                    MockElement::link("Login", routes::USER_LOGIN).class("btn"),
                ],
            ),
            routes::SHOP => (
                format!("Shop | {}", site),
                catalog
                    .products
                    .iter()
                    .map(|p| {
                        MockElement::new("div", p.title.clone())
                            .class("gl-shop-card")
                            .action(ElementAction::Navigate(routes::product(&p.slug)))
                    })
                    .collect(),
            ),
            routes::CART => {
                let mut elements = vec![MockElement::new("h1", "Your Cart")];
                for (item, quantity) in &self.cart {
                    elements.push(MockElement::new("td", item.clone()));
                    let cell = MockElement::new("td", quantity.to_string());
                    elements.push(cell.alias(markup::cart_quantity(item)));
                }
                (format!("Cart | {}", site), elements)
            }
            routes::USER_LOGIN => (
                format!("Login | {}", site),
                vec![
                    MockElement::input("email"),
                    MockElement::link("Admin Login", routes::ADMIN_LOGIN),
                ],
            ),
            routes::ADMIN_LOGIN => {
                let mut elements = vec![
                    MockElement::input("username").class("username-box"),
                    MockElement::input("password").class("password-box"),
                    MockElement::new("button", "Log In")
                        .class("login_button")
                        .action(ElementAction::Login),
                ];
                if self.login_failed {
                    let error = MockElement::new("p", "Invalid username or password");
                    elements.push(error.class("error"));
                }
                (format!("Admin Login | {}", site), elements)
            }
            routes::ADMIN_PORTAL => (
                format!("Admin Portal | {}", site),
                vec![
                    MockElement::link("Shop Management", routes::SHOP_MANAGEMENT),
                    MockElement::link("Content Management", routes::CONTENT_MANAGEMENT),
                    MockElement::link("Client Management", routes::CLIENT_MANAGEMENT),
                ],
            ),
            routes::SHOP_MANAGEMENT => {
                let mut elements = vec![MockElement::link("Add New Product", routes::NEW_PRODUCT)];
                for product in &catalog.listed {
                    let row = format!("{} {} {}", product.title, product.price, product.stock);
                    elements.push(
                        MockElement::new("tr", row).alias(markup::product_row(&product.title)),
                    );
                    elements.push(
                        MockElement::new("button", "Delete")
                            .alias(markup::product_delete(&product.title))
                            .action(ElementAction::Delete(product.title.clone())),
                    );
                }
                (format!("Shop Management | {}", site), elements)
            }
            routes::NEW_PRODUCT => (
                format!("New Product | {}", site),
                vec![
                    MockElement::input("title"),
                    MockElement::input("price"),
                    MockElement::input("stock"),
                    MockElement::input("image"),
                    MockElement::new("button", "Save")
                        .alias(markup::product_submit())
                        .action(ElementAction::SubmitProduct),
                ],
            ),
            routes::CONTENT_MANAGEMENT if self.in_frame => {
                let mut elements = vec![
                    MockElement::new("h2", "Manage About Us").alias(markup::about_header()),
                    MockElement::input("title"),
                    MockElement::input("description"),
                    MockElement::input("image"),
                    MockElement::new("button", "Add Content Block")
                        .alias(markup::content_block_submit())
                        .action(ElementAction::SubmitBlock),
                ];
                for block in &catalog.blocks {
                    let row = MockElement::new("tr", block.clone());
                    elements.push(row.alias(markup::content_block_row(block)));
                    elements.push(
                        MockElement::new("button", "Delete")
                            .alias(markup::content_block_delete(block))
                            .action(ElementAction::DeleteBlock(block.clone())),
                    );
                }
                // The session title stays the top document's
                (format!("Content Management | {}", site), elements)
            }
            routes::CONTENT_MANAGEMENT => {
                let mut elements = vec![
                    MockElement::new("h1", "Content Management"),
                    MockElement::new("button", "About Us")
                        .alias(markup::about_tab())
                        .action(ElementAction::OpenPanel),
                ];
                if self.panel_open {
                    elements.push(MockElement::new("div", "").alias(markup::about_panel()));
                    elements.push(MockElement::new("iframe", "").alias(markup::about_frame()));
                }
                (format!("Content Management | {}", site), elements)
            }
            routes::CLIENT_MANAGEMENT => (
                format!("Client Management | {}", site),
                vec![
                    MockElement::new("h1", "Client Management"),
                    MockElement::link("Application Results", routes::APPLICATION_RESULTS),
                    MockElement::link("Energy Leak Results", routes::ENERGY_LEAK_RESULTS),
                    MockElement::link("Add Client", routes::ADD_CLIENT),
                    MockElement::new("button", "Back to Admin Portal")
                        .alias(markup::back_to_portal_button())
                        .action(ElementAction::Navigate(routes::ADMIN_PORTAL.to_string())),
                ],
            ),
            routes::APPLICATION_RESULTS | routes::ENERGY_LEAK_RESULTS => (
                format!("Quiz Results | {}", site),
                vec![
                    MockElement::new("h1", "Results"),
                    MockElement::link("Back", routes::CLIENT_MANAGEMENT)
                        .class("btn")
                        .class("back-page-action")
                        .alias(markup::back_page_link()),
                ],
            ),
            routes::ADD_CLIENT => (
                format!("Add Client | {}", site),
                vec![
                    MockElement::input("name"),
                    MockElement::link("Back", routes::ADMIN_PORTAL)
                        .class("btn-back")
                        .alias(markup::add_client_back_link()),
                ],
            ),
            other => match other
                .strip_prefix("/shop/")
                .and_then(|slug| catalog.products.iter().find(|p| p.slug == slug))
            {
                Some(product) => (
                    format!("{} | {}", product.title, site),
                    vec![
                        MockElement::new("h1", product.title.clone()),
                        MockElement::new("button", "Add to Cart")
                            .alias(markup::add_to_cart_button())
                            .action(ElementAction::AddToCart(product.title.clone())),
                    ],
                ),
                None => ("Not Found".to_string(), vec![MockElement::new("h1", "404")]),
            },
        };
        Ok(page)
    }

    /// Advance the admin list towards the catalog; re-render if it changed
    fn refresh_listing(&mut self) -> BrowserResult<()> {
        if self.path != routes::SHOP_MANAGEMENT {
            return Ok(());
        }
        let changed = {
            let mut catalog = lock(&self.catalog)?;
            if catalog.lag_remaining > 0 {
                catalog.lag_remaining -= 1;
                false
            } else if catalog.listed != catalog.products {
                catalog.listed = catalog.products.clone();
                true
            } else {
                false
            }
        };
        if changed {
            self.render()?;
        }
        Ok(())
    }

    fn perform(&mut self, action: ElementAction) -> BrowserResult<()> {
        match action {
            ElementAction::None => Ok(()),
            ElementAction::Navigate(path) => self.load(&path),
            ElementAction::AddToCart(item) => {
                *self.cart.entry(item).or_insert(0) += 1;
                self.load(routes::CART)
            }
            ElementAction::Login => {
                let username = self.fields.get("username").cloned().unwrap_or_default();
                let password = self.fields.get("password").cloned().unwrap_or_default();
                let options = &self.options;
                if username == options.admin_username && password == options.admin_password {
                    self.admin = true;
                    self.login_failed = false;
                    self.load(routes::ADMIN_PORTAL)
                } else {
                    self.login_failed = true;
                    self.load(routes::ADMIN_LOGIN)
                }
            }
            ElementAction::SubmitProduct => {
                let title = self.fields.get("title").cloned().unwrap_or_default();
                if title.trim().is_empty() {
                    return self.render();
                }
                {
                    let mut catalog = lock(&self.catalog)?;
                    catalog.products.push(Product {
                        slug: slugify(&title),
                        title: title.trim().to_string(),
                        price: self.fields.get("price").cloned().unwrap_or_default(),
                        stock: self.fields.get("stock").cloned().unwrap_or_default(),
                    });
                    catalog.mutated(self.options.list_lag_reads);
                }
                self.load(routes::SHOP_MANAGEMENT)
            }
            ElementAction::Delete(title) => {
                if self.options.confirm_delete {
                    self.alert = Some(PendingAlert {
                        text: format!("Delete {}?", title),
                        on_accept: ElementAction::RemoveProduct(title),
                    });
                    return Ok(());
                }
                self.perform(ElementAction::RemoveProduct(title))
            }
            ElementAction::RemoveProduct(title) => {
                {
                    let mut catalog = lock(&self.catalog)?;
                    if let Some(pos) = catalog.products.iter().position(|p| p.title == title) {
                        catalog.products.remove(pos);
                    }
                    catalog.mutated(self.options.list_lag_reads);
                }
                self.load(routes::SHOP_MANAGEMENT)
            }
            ElementAction::OpenPanel => {
                self.panel_open = true;
                self.render()
            }
            ElementAction::SubmitBlock => {
                let title = self.fields.get("title").cloned().unwrap_or_default();
                if !title.trim().is_empty() {
                    lock(&self.catalog)?.blocks.push(title.trim().to_string());
                }
                self.fields.clear();
                self.render()
            }
            ElementAction::DeleteBlock(title) => {
                {
                    let mut catalog = lock(&self.catalog)?;
                    if let Some(pos) = catalog.blocks.iter().position(|b| *b == title) {
                        catalog.blocks.remove(pos);
                    }
                }
                self.render()
            }
        }
    }
}

impl BrowserSession for MockBrowser {
    fn navigate(&mut self, url: &str) -> BrowserResult<()> {
        self.ensure_no_alert()?;
        match url.strip_prefix(&self.base_url) {
            Some(path) => self.load(path),
            None => {
                self.path.clear();
                self.url = url.to_string();
                self.title = String::new();
                self.elements.clear();
                self.generation += 1;
                Ok(())
            }
        }
    }

    fn current_url(&mut self) -> BrowserResult<String> {
        self.ensure_no_alert()?;
        Ok(self.url.clone())
    }

    fn title(&mut self) -> BrowserResult<String> {
        self.ensure_no_alert()?;
        Ok(self.title.clone())
    }

    fn find_elements(&mut self, locator: &Locator) -> BrowserResult<Vec<ElementRef>> {
        self.ensure_no_alert()?;
        self.refresh_listing()?;
        Ok(self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.matches(locator))
            .map(|(i, _)| ElementRef(format!("{}:{}", self.generation, i)))
            .collect())
    }

    fn text(&mut self, element: &ElementRef) -> BrowserResult<String> {
        self.ensure_no_alert()?;
        Ok(self.element(element)?.text.clone())
    }

    fn tag_name(&mut self, element: &ElementRef) -> BrowserResult<String> {
        self.ensure_no_alert()?;
        Ok(self.element(element)?.tag.to_string())
    }

    fn is_displayed(&mut self, element: &ElementRef) -> BrowserResult<bool> {
        self.ensure_no_alert()?;
        self.element(element).map(|_| true)
    }

    fn is_enabled(&mut self, element: &ElementRef) -> BrowserResult<bool> {
        self.ensure_no_alert()?;
        self.element(element).map(|_| true)
    }

    fn click(&mut self, element: &ElementRef) -> BrowserResult<()> {
        self.ensure_no_alert()?;
        let action = self.element(element)?.action.clone();
        self.perform(action)
    }

    fn send_keys(&mut self, element: &ElementRef, text: &str) -> BrowserResult<()> {
        self.ensure_no_alert()?;
        let field = self.element(element)?.field;
        if let Some(field) = field {
            self.fields.entry(field).or_default().push_str(text);
        }
        Ok(())
    }

    fn clear(&mut self, element: &ElementRef) -> BrowserResult<()> {
        self.ensure_no_alert()?;
        let field = self.element(element)?.field;
        if let Some(field) = field {
            self.fields.remove(field);
        }
        Ok(())
    }

    fn screenshot_png(&mut self) -> BrowserResult<Vec<u8>> {
        self.ensure_no_alert()?;
        if self.options.screenshot_error {
            return Err(BrowserError::Protocol {
                error: "unable to capture screen".to_string(),
                message: "screenshots disabled".to_string(),
            });
        }
        let lines: Vec<String> = self
            .elements
            .iter()
            .filter(|el| !el.text.is_empty())
            .map(|el| format!("[{}] {}", el.tag, el.text))
            .collect();
        let page = render_page(&self.title, &self.url, &lines);
        encode_png(&page).map_err(|e| BrowserError::Protocol {
            error: "unable to capture screen".to_string(),
            message: e.to_string(),
        })
    }

    fn alert_text(&mut self) -> BrowserResult<String> {
        self.ensure_open()?;
        self.alert.as_ref().map(|a| a.text.clone()).ok_or(BrowserError::NoSuchAlert)
    }

    fn accept_alert(&mut self) -> BrowserResult<()> {
        self.ensure_open()?;
        let alert = self.alert.take().ok_or(BrowserError::NoSuchAlert)?;
        self.perform(alert.on_accept)
    }

    fn switch_to_frame(&mut self, element: &ElementRef) -> BrowserResult<()> {
        self.ensure_no_alert()?;
        if self.element(element)?.tag != "iframe" {
            return Err(BrowserError::Protocol {
                error: "no such frame".to_string(),
                message: format!("element {} is not a frame", element),
            });
        }
        self.in_frame = true;
        self.render()
    }

    fn switch_to_parent_frame(&mut self) -> BrowserResult<()> {
        self.ensure_no_alert()?;
        if self.in_frame {
            self.in_frame = false;
            self.render()?;
        }
        Ok(())
    }

    fn quit(&mut self) -> BrowserResult<()> {
        if !self.closed {
            self.closed = true;
            self.closed_counter.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Lowercase, dash-separated slug of a product title
fn slugify(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
