//! Session controller
//!
//! State machine over {Anonymous, Authenticated(login)}. Every menu
//! selection made while authenticated is routed through the access gate
//! with a role freshly loaded from the store, so denied actions never
//! reach a repository and a mid-session role change takes effect on the
//! next action. An unauthorized selection renders the same message as a
//! nonexistent one.

use std::io;

use sqlx::PgPool;
use tracing::error;

use crate::access::{self, Action};
use crate::cart::Cart;
use crate::catalog::{MenuFilter, SortOrder};
use crate::error::{AppError, AppResult};
use crate::input::LineSource;
use crate::models::{NewItem, NewUser, OrderScope, OrderStatus, Role, UpdateItem, UpdateUser};
use crate::repositories::{ItemRepository, OrderRepository, StoreRepository, UserRepository};
use crate::validation;

/// Number of orders shown by the recent-orders view
const RECENT_ORDERS: i64 = 5;

const SEPARATOR: &str = "-----------------------------------------";

/// Entry that ends the authenticated menu loop
const LOG_OUT_CHOICE: &str = "20";

/// One dispatchable authenticated menu selection; logging out is
/// handled by the menu loop itself and never reaches the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    ViewProfile,
    UpdateProfile,
    ViewMenu,
    PlaceOrder,
    FullOrderHistory,
    RecentOrderHistory,
    OrderDetail,
    ViewStores,
    UpdateOrderStatus,
    UpdateMenu,
    UpdateUser,
}

/// Map a menu entry to a choice; `None` for anything unrecognized
pub fn parse_menu_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "1" => Some(MenuChoice::ViewProfile),
        "2" => Some(MenuChoice::UpdateProfile),
        "3" => Some(MenuChoice::ViewMenu),
        "4" => Some(MenuChoice::PlaceOrder),
        "5" => Some(MenuChoice::FullOrderHistory),
        "6" => Some(MenuChoice::RecentOrderHistory),
        "7" => Some(MenuChoice::OrderDetail),
        "8" => Some(MenuChoice::ViewStores),
        "9" => Some(MenuChoice::UpdateOrderStatus),
        "10" => Some(MenuChoice::UpdateMenu),
        "11" => Some(MenuChoice::UpdateUser),
        _ => None,
    }
}

/// The action the gate must approve before a choice is carried out.
///
/// Both history views request the own-orders action, which every role
/// holds; the handler widens the scope to all orders only when the gate
/// also grants the all-orders action.
pub fn action_for(choice: MenuChoice) -> Action {
    match choice {
        MenuChoice::ViewProfile => Action::ViewProfile,
        MenuChoice::UpdateProfile => Action::UpdateProfile,
        MenuChoice::ViewMenu => Action::ViewMenu,
        MenuChoice::PlaceOrder => Action::PlaceOrder,
        MenuChoice::FullOrderHistory | MenuChoice::RecentOrderHistory => Action::ViewOwnOrders,
        MenuChoice::OrderDetail => Action::ViewOrderDetail,
        MenuChoice::ViewStores => Action::ViewStores,
        MenuChoice::UpdateOrderStatus => Action::UpdateOrderStatus,
        MenuChoice::UpdateMenu => Action::UpdateMenu,
        MenuChoice::UpdateUser => Action::UpdateUser,
    }
}

/// Console session over the order management repositories
pub struct SessionController<I: LineSource> {
    users: UserRepository,
    items: ItemRepository,
    stores: StoreRepository,
    orders: OrderRepository,
    input: I,
}

impl<I: LineSource> SessionController<I> {
    /// Create a session controller over a connected pool
    pub fn new(pool: PgPool, input: I) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            items: ItemRepository::new(pool.clone()),
            stores: StoreRepository::new(pool.clone()),
            orders: OrderRepository::new(pool),
            input,
        }
    }

    /// Run the anonymous main loop until the user exits or input closes
    pub async fn run(&mut self) -> AppResult<()> {
        loop {
            println!("MAIN MENU");
            println!("---------");
            println!("1. Create user");
            println!("2. Log in");
            println!("9. Exit");

            let Some(choice) = self.input.next_line("Please make your choice: ")? else {
                return Ok(());
            };

            match choice.trim() {
                "1" => {
                    if let Err(e) = self.register().await {
                        self.handle(e)?;
                    }
                }
                "2" => match self.login().await {
                    Ok(Some(login)) => self.user_menu(&login).await?,
                    Ok(None) => {}
                    Err(e) => self.handle(e)?,
                },
                "9" => return Ok(()),
                _ => println!("Unrecognized choice."),
            }
        }
    }

    /// Report a recoverable error; input failures stay fatal
    fn handle(&self, err: AppError) -> AppResult<()> {
        match err {
            AppError::Validation(msg) => println!("{}", msg),
            AppError::NotFound(what) => println!("{} not found.", what),
            AppError::Forbidden => println!("Unrecognized choice."),
            AppError::Conflict | AppError::Store(_) => {
                error!("store failure: {}", err);
                println!("Something went wrong talking to the store. Please try again later.");
            }
            AppError::Io(_) => return Err(err),
        }
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> AppResult<String> {
        match self.input.next_line(text)? {
            Some(line) => Ok(line),
            None => Err(AppError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            ))),
        }
    }

    /// Register a new customer account
    async fn register(&mut self) -> AppResult<()> {
        let login = loop {
            let input = self.prompt("Please enter your new login or 'q' to cancel: ")?;
            let input = input.trim().to_string();
            if input == "q" {
                return Ok(());
            }
            if let Err(msg) = validation::validate_login(&input) {
                println!("{}", msg);
                continue;
            }
            if self.users.find_by_login(&input).await?.is_some() {
                println!(
                    "User {} already exists. Please use a different login.",
                    input
                );
                continue;
            }
            break input;
        };
        println!("{}", SEPARATOR);
        println!("Login available.");

        let password = loop {
            let input = self.prompt("Please enter your new password: ")?;
            match validation::validate_password(&input) {
                Ok(()) => break input,
                Err(msg) => println!("{}", msg),
            }
        };

        let phone_number = loop {
            let input = self.prompt("Lastly, please enter your phone number: ")?;
            let input = input.trim().to_string();
            match validation::validate_phone_number(&input) {
                Ok(()) => break input,
                Err(msg) => println!("{}", msg),
            }
        };

        self.users
            .create(&NewUser {
                login,
                password,
                phone_number,
            })
            .await?;

        println!("{}", SEPARATOR);
        println!("Successfully created user. Returning to main menu...");
        Ok(())
    }

    /// Authenticate an existing user; `None` when the login is unknown
    async fn login(&mut self) -> AppResult<Option<String>> {
        let login = self.prompt("Please enter login: ")?;
        let login = login.trim().to_string();

        let Some(user) = self.users.find_by_login(&login).await? else {
            println!("No user, returning to main menu.");
            return Ok(None);
        };

        loop {
            let password = self.prompt("Please enter password: ")?;
            if self.users.verify_password(&user, &password)? {
                println!("Login success!");
                return Ok(Some(login));
            }
            println!("Incorrect username or password! Please try again.");
        }
    }

    /// Authenticated menu loop
    async fn user_menu(&mut self, login: &str) -> AppResult<()> {
        loop {
            println!("MAIN MENU");
            println!("---------");
            println!("1. View Profile");
            println!("2. Update Profile");
            println!("3. View Menu");
            println!("4. Place Order");
            println!("5. View Full Order History");
            println!("6. View Past {} Orders", RECENT_ORDERS);
            println!("7. View Order Information");
            println!("8. View Stores");
            println!("9. Update Order Status");
            println!("10. Update Menu");
            println!("11. Update User");
            println!(".........................");
            println!("20. Log out");

            let line = self.prompt("Please make your choice: ")?;
            if line.trim() == LOG_OUT_CHOICE {
                println!("Logging out.");
                return Ok(());
            }

            let Some(choice) = parse_menu_choice(&line) else {
                println!("Unrecognized choice.");
                continue;
            };

            if let Err(e) = self.dispatch(login, choice).await {
                self.handle(e)?;
            }
        }
    }

    /// Re-check the role against the store, gate the action, then run it
    async fn dispatch(&mut self, login: &str, choice: MenuChoice) -> AppResult<()> {
        let role = self.users.role_of(login).await?;

        if !access::is_allowed(role, action_for(choice)) {
            return Err(AppError::Forbidden);
        }

        match choice {
            MenuChoice::ViewProfile => self.view_profile(login).await,
            MenuChoice::UpdateProfile => self.update_profile(login).await,
            MenuChoice::ViewMenu => self.view_menu().await,
            MenuChoice::PlaceOrder => self.place_order(login).await,
            MenuChoice::FullOrderHistory => self.order_history(login, role, false).await,
            MenuChoice::RecentOrderHistory => self.order_history(login, role, true).await,
            MenuChoice::OrderDetail => self.view_order_detail(login, role).await,
            MenuChoice::ViewStores => self.view_stores().await,
            MenuChoice::UpdateOrderStatus => self.update_order_status(login, role).await,
            MenuChoice::UpdateMenu => self.update_menu().await,
            MenuChoice::UpdateUser => self.update_user().await,
        }
    }

    async fn view_profile(&mut self, login: &str) -> AppResult<()> {
        let user = self
            .users
            .find_by_login(login)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        println!("{}", SEPARATOR);
        println!("Current user fields");
        println!();
        println!("Login: {}", user.login);
        println!("Password: ********");
        println!("Role: {}", user.role);
        println!(
            "Favorite Item: {}",
            user.favorite_item.as_deref().unwrap_or("(none)")
        );
        println!("Phone Number: {}", user.phone_number);
        println!("{}", SEPARATOR);
        Ok(())
    }

    async fn update_profile(&mut self, login: &str) -> AppResult<()> {
        println!("{}", SEPARATOR);
        println!("Which field would you like to change?");
        println!("1. Password");
        println!("2. Favorite Item");
        println!("3. Phone Number");
        println!("4. Return to Main Menu");

        let update = loop {
            let choice = self.prompt("Desired field: ")?;
            match choice.trim() {
                "1" => {
                    let value = self.prompt("Desired value: ")?;
                    validation::validate_password(&value).map_err(AppError::Validation)?;
                    break UpdateUser {
                        password: Some(value),
                        ..Default::default()
                    };
                }
                "2" => {
                    let value = self.prompt("Desired value (empty to clear): ")?;
                    let value = value.trim().to_string();
                    let favorite_item = if value.is_empty() {
                        None
                    } else {
                        // favorite item references the catalog
                        if self.items.find_by_name(&value).await?.is_none() {
                            return Err(AppError::NotFound("Item"));
                        }
                        Some(value)
                    };
                    break UpdateUser {
                        favorite_item: Some(favorite_item),
                        ..Default::default()
                    };
                }
                "3" => {
                    let value = self.prompt("Desired value: ")?;
                    let value = value.trim().to_string();
                    validation::validate_phone_number(&value).map_err(AppError::Validation)?;
                    break UpdateUser {
                        phone_number: Some(value),
                        ..Default::default()
                    };
                }
                "4" => return Ok(()),
                _ => println!("Please enter a valid choice."),
            }
        };

        self.users.update(login, &update).await?;
        println!("Profile successfully updated. Returning to main menu...");
        Ok(())
    }

    /// Catalog browsing loop with composable filters.
    ///
    /// A store failure is reported and the loop continues with the
    /// current filter state intact.
    async fn view_menu(&mut self) -> AppResult<()> {
        let mut filter = MenuFilter::default();

        loop {
            println!("Pizza Menu");
            println!("{}", SEPARATOR);

            match self.items.list(&filter).await {
                Ok(items) => {
                    for item in &items {
                        println!(
                            "{} | {} | ${}",
                            item.name,
                            item.item_type.trim(),
                            item.price
                        );
                    }
                }
                Err(e) => self.handle(e)?,
            }

            println!("{}", SEPARATOR);
            println!("Options");
            println!("1. Filter by Type");
            println!("2. Filter by Max Price");
            println!("3. Sort Price Low to High");
            println!("4. Sort Price High to Low");
            println!("5. Clear Filters");
            println!("6. Exit");

            let choice = self.prompt("Please enter option: ")?;
            match choice.trim() {
                "1" => loop {
                    let input = self.prompt(
                        "Please enter an item type. Valid selections are 'entree', 'drinks' or 'sides': ",
                    )?;
                    let input = input.trim();
                    if matches!(input, "entree" | "drinks" | "sides") {
                        filter.item_type = Some(input.to_string());
                        break;
                    }
                    println!("Please enter a valid item type.");
                },
                "2" => loop {
                    let input = self.prompt("Please enter a maximum price: ")?;
                    match validation::parse_price(&input) {
                        Ok(price) => {
                            filter.max_price = Some(price);
                            break;
                        }
                        Err(msg) => println!("{}", msg),
                    }
                },
                "3" => filter.sort = SortOrder::Ascending,
                "4" => filter.sort = SortOrder::Descending,
                "5" => filter.clear(),
                "6" => return Ok(()),
                _ => println!("Unrecognized choice."),
            }
        }
    }

    /// Build a cart against a validated store and submit it as an order
    async fn place_order(&mut self, login: &str) -> AppResult<()> {
        let store_id = self.prompt("Please enter a store ID: ")?;
        let store_id = store_id.trim().to_string();

        let Some(store) = self.stores.find_by_id(&store_id).await? else {
            println!(
                "Store {} does not exist. Returning to main menu.",
                store_id
            );
            return Ok(());
        };
        if !store.is_open {
            println!(
                "Store {} is currently closed. Returning to main menu.",
                store.store_id
            );
            return Ok(());
        }

        let mut cart = Cart::new(store.store_id);

        loop {
            let name = self.prompt("Item name ('done' to submit, 'q' to cancel): ")?;
            match name.trim() {
                "q" => {
                    println!("Order cancelled.");
                    return Ok(());
                }
                "done" => {
                    if cart.is_empty() {
                        println!("The cart is empty; nothing to submit.");
                        continue;
                    }
                    break;
                }
                "" => continue,
                item_name => {
                    let Some(item) = self.items.find_by_name(item_name).await? else {
                        println!("Item {} not found.", item_name);
                        continue;
                    };

                    let quantity_line = self.prompt("Quantity: ")?;
                    let quantity = match validation::parse_quantity(&quantity_line) {
                        Ok(q) => q,
                        Err(msg) => {
                            println!("{}", msg);
                            continue;
                        }
                    };

                    match cart.add(&item, quantity) {
                        Ok(()) => println!(
                            "Added {} x {}. Running total: ${}",
                            quantity,
                            item.name,
                            cart.total()
                        ),
                        Err(e) => println!("{}", e),
                    }
                }
            }
        }

        // the cart survives a failed submission so the user can retry
        loop {
            match self.orders.create(&cart.to_new_order(login)).await {
                Ok(order_id) => {
                    println!("{}", SEPARATOR);
                    println!("Order {} placed. Total: ${}", order_id, cart.total());
                    return Ok(());
                }
                Err(e) => {
                    self.handle(e)?;
                    let again = self.prompt("Retry submission? (y/n): ")?;
                    if again.trim() != "y" {
                        println!("Order not submitted.");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Order history view; staff see everything, customers their own
    async fn order_history(&mut self, login: &str, role: Role, recent: bool) -> AppResult<()> {
        let scope = if recent {
            if access::is_allowed(role, Action::ViewRecentOrders) {
                OrderScope::Recent(RECENT_ORDERS)
            } else {
                OrderScope::OwnRecent(RECENT_ORDERS)
            }
        } else if access::is_allowed(role, Action::ViewAllOrders) {
            OrderScope::All
        } else {
            OrderScope::Own
        };

        let orders = self.orders.list(login, role, scope).await?;

        println!("{}", SEPARATOR);
        if orders.is_empty() {
            println!("No orders found.");
        }
        for order in &orders {
            println!(
                "Order {} | {} | store {} | ${} | {} | {}",
                order.order_id,
                order.login,
                order.store_id,
                order.total_price,
                order.created_at.format("%Y-%m-%d %H:%M:%S"),
                order.status
            );
        }
        println!("{}", SEPARATOR);
        Ok(())
    }

    async fn view_order_detail(&mut self, login: &str, role: Role) -> AppResult<()> {
        let input = self.prompt("Order ID: ")?;
        let order_id: i64 = input
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Please enter a valid order ID".to_string()))?;

        let detail = self.orders.detail(order_id, login, role).await?;

        println!("{}", SEPARATOR);
        println!(
            "Order {} | placed {} | total ${} | {}",
            detail.order.order_id,
            detail.order.created_at.format("%Y-%m-%d %H:%M:%S"),
            detail.order.total_price,
            detail.order.status
        );
        for line in &detail.lines {
            println!("  {} x {}", line.quantity, line.item_name);
        }
        println!("{}", SEPARATOR);
        Ok(())
    }

    async fn view_stores(&mut self) -> AppResult<()> {
        let stores = self.stores.list().await?;

        println!("All Stores");
        println!("{}", SEPARATOR);
        for store in &stores {
            println!(
                "{} {}, {}, {} {}",
                store.store_id,
                store.address,
                store.city,
                store.state,
                if store.is_open { "Open" } else { "Closed" }
            );
        }
        println!("{}", SEPARATOR);
        Ok(())
    }

    /// Driver/manager: flip an order between incomplete and complete
    async fn update_order_status(&mut self, login: &str, role: Role) -> AppResult<()> {
        let input = self.prompt("Order ID: ")?;
        let order_id: i64 = input
            .trim()
            .parse()
            .map_err(|_| AppError::Validation("Please enter a valid order ID".to_string()))?;

        let detail = self.orders.detail(order_id, login, role).await?;
        println!("{}", SEPARATOR);
        println!("Current order status: {}", detail.order.status);

        let status = loop {
            let choice = self.prompt("Enter new status, incomplete (i) or complete (c): ")?;
            match choice.trim() {
                "i" => break OrderStatus::Incomplete,
                "c" => break OrderStatus::Complete,
                _ => println!("Unrecognized choice, please try again."),
            }
        };

        self.orders.update_status(order_id, status).await?;
        println!("Order status updated. Returning to main menu...");
        Ok(())
    }

    /// Manager: add a catalog item or change a field of an existing one
    async fn update_menu(&mut self) -> AppResult<()> {
        println!("{}", SEPARATOR);
        println!("1. Add Item");
        println!("2. Update Item");
        println!("3. Return to Main Menu");

        let choice = self.prompt("Please make your choice: ")?;
        match choice.trim() {
            "1" => {
                let name = self.prompt("Item name: ")?;
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(AppError::Validation("Item name is required".to_string()));
                }
                let ingredients = self.prompt("Ingredients: ")?;
                let item_type = self.prompt("Type (entree/drinks/sides): ")?;
                let price = loop {
                    let input = self.prompt("Price: ")?;
                    match validation::parse_price(&input) {
                        Ok(p) => break p,
                        Err(msg) => println!("{}", msg),
                    }
                };
                let description = self.prompt("Description: ")?;

                self.items
                    .create(&NewItem {
                        name,
                        ingredients,
                        item_type: item_type.trim().to_string(),
                        price,
                        description,
                    })
                    .await?;
                println!("Item added to the menu.");
                Ok(())
            }
            "2" => {
                let name = self.prompt("Item name: ")?;
                let name = name.trim().to_string();
                if self.items.find_by_name(&name).await?.is_none() {
                    return Err(AppError::NotFound("Item"));
                }

                println!("Which field would you like to change?");
                println!("1. Ingredients");
                println!("2. Type");
                println!("3. Price");
                println!("4. Description");

                let field = self.prompt("Desired field: ")?;
                let update = match field.trim() {
                    "1" => UpdateItem {
                        ingredients: Some(self.prompt("Desired value: ")?),
                        ..Default::default()
                    },
                    "2" => UpdateItem {
                        item_type: Some(self.prompt("Desired value: ")?.trim().to_string()),
                        ..Default::default()
                    },
                    "3" => {
                        let input = self.prompt("Desired value: ")?;
                        let price = validation::parse_price(&input).map_err(AppError::Validation)?;
                        UpdateItem {
                            price: Some(price),
                            ..Default::default()
                        }
                    }
                    "4" => UpdateItem {
                        description: Some(self.prompt("Desired value: ")?),
                        ..Default::default()
                    },
                    _ => return Err(AppError::Validation("Please enter a valid choice".to_string())),
                };

                self.items.update(&name, &update).await?;
                println!("Item updated. Returning to main menu...");
                Ok(())
            }
            "3" => Ok(()),
            _ => Err(AppError::Validation("Please enter a valid choice".to_string())),
        }
    }

    /// Manager: change any field of any user, including login and role
    async fn update_user(&mut self) -> AppResult<()> {
        let target = self.prompt("Please enter the user's login: ")?;
        let target = target.trim().to_string();

        let user = self
            .users
            .find_by_login(&target)
            .await?
            .ok_or(AppError::NotFound("User"))?;

        println!("{}", SEPARATOR);
        println!("Current user fields");
        println!();
        println!("Login: {}", user.login);
        println!("Password: ********");
        println!("Role: {}", user.role);
        println!(
            "Favorite Item: {}",
            user.favorite_item.as_deref().unwrap_or("(none)")
        );
        println!("Phone Number: {}", user.phone_number);
        println!("{}", SEPARATOR);
        println!("Which field would you like to change?");
        println!("1. Login");
        println!("2. Password");
        println!("3. Role");
        println!("4. Favorite Item");
        println!("5. Phone Number");
        println!("6. Return to Main Menu");

        let choice = self.prompt("Desired field: ")?;
        match choice.trim() {
            "1" => {
                let value = self.prompt("Desired value: ")?;
                let value = value.trim().to_string();
                validation::validate_login(&value).map_err(AppError::Validation)?;
                self.users.rename(&target, &value).await?;
            }
            "2" => {
                let value = self.prompt("Desired value: ")?;
                validation::validate_password(&value).map_err(AppError::Validation)?;
                self.users
                    .update(
                        &target,
                        &UpdateUser {
                            password: Some(value),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            "3" => {
                let value = self.prompt("Desired value (customer/driver/manager): ")?;
                let role: Role = value.parse().map_err(AppError::Validation)?;
                self.users
                    .update(
                        &target,
                        &UpdateUser {
                            role: Some(role),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            "4" => {
                let value = self.prompt("Desired value (empty to clear): ")?;
                let value = value.trim().to_string();
                let favorite_item = if value.is_empty() {
                    None
                } else {
                    if self.items.find_by_name(&value).await?.is_none() {
                        return Err(AppError::NotFound("Item"));
                    }
                    Some(value)
                };
                self.users
                    .update(
                        &target,
                        &UpdateUser {
                            favorite_item: Some(favorite_item),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            "5" => {
                let value = self.prompt("Desired value: ")?;
                let value = value.trim().to_string();
                validation::validate_phone_number(&value).map_err(AppError::Validation)?;
                self.users
                    .update(
                        &target,
                        &UpdateUser {
                            phone_number: Some(value),
                            ..Default::default()
                        },
                    )
                    .await?;
            }
            "6" => return Ok(()),
            _ => return Err(AppError::Validation("Please enter a valid choice".to_string())),
        }

        println!("User successfully updated. Returning to main menu...");
        Ok(())
    }
}
