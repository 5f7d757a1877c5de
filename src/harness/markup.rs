//! Routes and locators of the application under test.
//!
//! This is the contract between the harness and the application's markup.
//! Renaming a class, link text or route in the application breaks the
//! scenarios that use the corresponding entry here, and nothing else.

use crate::browser::Locator;

/// Route paths, joined onto the configured base URL
pub mod routes {
    pub const HOME: &str = "/";
    pub const SHOP: &str = "/shop";
    pub const CART: &str = "/cart";
    pub const USER_LOGIN: &str = "/login";
    pub const ADMIN_LOGIN: &str = "/login/admin";
    pub const ADMIN_PORTAL: &str = "/adminportal";
    pub const SHOP_MANAGEMENT: &str = "/shop/admin/list";
    pub const NEW_PRODUCT: &str = "/shop/admin/new";
    pub const CONTENT_MANAGEMENT: &str = "/contentmanagement";
    pub const CLIENT_MANAGEMENT: &str = "/clientmanagement";
    pub const APPLICATION_RESULTS: &str = "/clientmanagement/prequiz-results";
    pub const ENERGY_LEAK_RESULTS: &str = "/clientmanagement/chakraquiz-results";
    pub const ADD_CLIENT: &str = "/clientmanagement/add";

    /// Detail page of a catalog item
    pub fn product(slug: &str) -> String {
        format!("{}/{}", SHOP, slug)
    }
}

/// Page title of the storefront home page
pub const HOME_TITLE: &str = "GracefuLiving";

// --- storefront ---

pub fn shop_link() -> Locator {
    Locator::link_text("Shop")
}

pub fn shop_card() -> Locator {
    Locator::class_name("gl-shop-card")
}

pub fn add_to_cart_button() -> Locator {
    Locator::xpath("//button[normalize-space(text())='Add to Cart']")
}

/// Quantity cell of the cart row whose first cell reads `item`
pub fn cart_quantity(item: &str) -> Locator {
    Locator::xpath(format!("//tr[td[normalize-space()={}]]/td[2]", xpath_literal(item)))
}

// --- authentication ---

pub fn login_button() -> Locator {
    Locator::class_name("btn")
}

pub fn admin_login_link() -> Locator {
    Locator::link_text("Admin Login")
}

pub fn username_field() -> Locator {
    Locator::class_name("username-box")
}

pub fn password_field() -> Locator {
    Locator::class_name("password-box")
}

pub fn login_submit() -> Locator {
    Locator::class_name("login_button")
}

// --- admin portal ---

pub fn shop_management_link() -> Locator {
    Locator::link_text("Shop Management")
}

pub fn content_management_link() -> Locator {
    Locator::link_text("Content Management")
}

pub fn client_management_link() -> Locator {
    Locator::link_text("Client Management")
}

pub fn back_to_portal_button() -> Locator {
    Locator::xpath("//button[contains(text(), 'Back to Admin Portal')]")
}

// --- client management ---

pub fn application_results_link() -> Locator {
    Locator::link_text("Application Results")
}

pub fn energy_leak_results_link() -> Locator {
    Locator::link_text("Energy Leak Results")
}

pub fn add_client_link() -> Locator {
    Locator::link_text("Add Client")
}

/// Back link on the results pages, returns to client management
pub fn back_page_link() -> Locator {
    Locator::xpath("//a[@class='btn back-page-action']")
}

/// Back link on the add-client form, returns to the portal
pub fn add_client_back_link() -> Locator {
    Locator::xpath("//a[@class='btn-back']")
}

// --- content management: About Us panel ---

pub fn about_tab() -> Locator {
    Locator::xpath("//button[@class='tab' and @data-target='panel-about']")
}

pub fn about_panel() -> Locator {
    Locator::id("panel-about")
}

/// The panel renders its editor inside this frame
pub fn about_frame() -> Locator {
    Locator::xpath("//iframe[@title='About Us Management']")
}

pub fn about_header() -> Locator {
    Locator::xpath("//h2[contains(text(), 'Manage About Us')]")
}

pub fn content_block_title_field() -> Locator {
    Locator::name("title")
}

pub fn content_block_description_field() -> Locator {
    Locator::name("description")
}

pub fn content_block_image_field() -> Locator {
    Locator::name("image")
}

pub fn content_block_submit() -> Locator {
    Locator::xpath("//button[text()='Add Content Block']")
}

/// Rows of the content block table titled `title`
pub fn content_block_row(title: &str) -> Locator {
    Locator::xpath(format!("//tbody/tr[td[contains(text(), {})]]", xpath_literal(title)))
}

pub fn content_block_delete(title: &str) -> Locator {
    Locator::xpath(format!(
        "//tr[td[contains(., {})]]//form/button[contains(text(), 'Delete')]",
        xpath_literal(title)
    ))
}

// --- shop management ---

pub fn new_product_link() -> Locator {
    Locator::link_text("Add New Product")
}

pub fn product_title_field() -> Locator {
    Locator::name("title")
}

pub fn product_price_field() -> Locator {
    Locator::name("price")
}

pub fn product_stock_field() -> Locator {
    Locator::name("stock")
}

pub fn product_image_field() -> Locator {
    Locator::name("image")
}

pub fn product_submit() -> Locator {
    Locator::css("button[type='submit']")
}

/// Rows of the admin product list titled `title`
pub fn product_row(title: &str) -> Locator {
    Locator::xpath(format!("//table//tr[td[normalize-space()={}]]", xpath_literal(title)))
}

/// Delete control inside the row titled `title`
pub fn product_delete(title: &str) -> Locator {
    Locator::xpath(format!(
        "//table//tr[td[normalize-space()={}]]//button[normalize-space()='Delete']",
        xpath_literal(title)
    ))
}

/// Quote a string for use inside an XPath expression.
///
/// XPath 1.0 has no escape sequences, so text containing both quote kinds
/// is spliced together with `concat()`.
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{}'", text);
    }
    if !text.contains('"') {
        return format!("\"{}\"", text);
    }
    let parts: Vec<String> = text.split('\'').map(|p| format!("'{}'", p)).collect();
    format!("concat({})", parts.join(", \"'\", "))
}
