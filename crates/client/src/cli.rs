//! Command-line front end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use common::{DishId, OrderRef, TableNo};
use domain::{Cart, Customer, CustomerUpdate, NewCustomer, Order, PlaceOrder};
use ordering::{
    Catalog, FeedbackService, OrderLifecycleController, RestaurantBackend, StatusUpdate,
};
use session_store::SessionStore;

use crate::error::{ClientError, ClientResult};

/// Dine-in ordering from the terminal.
#[derive(Debug, Parser)]
#[command(name = "dine", version, about)]
pub struct Cli {
    /// Backend base URL (overrides DINE_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Session file (overrides DINE_SESSION_FILE)
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the menu
    Menu {
        /// Only dishes whose category contains this text
        #[arg(long)]
        category: Option<String>,
    },
    /// Show free tables
    Tables,
    /// Sign in
    Login {
        email: String,
        #[arg(long, env = "DINE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account and sign in
    Register {
        name: String,
        email: String,
        #[arg(long, env = "DINE_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        contact: Option<String>,
    },
    /// Show the signed-in profile, or change it
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        contact: Option<String>,
    },
    /// Take a seat at a table
    Sit { table: String },
    /// Put a dish in the cart
    Add {
        dish_id: String,
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Take a dish out of the cart
    Remove { dish_id: String },
    /// Set a dish's quantity; zero or less removes it
    SetQuantity {
        dish_id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Show the cart and the open order
    Cart,
    /// Order everything in the cart
    Place { table: String },
    /// Add the cart to the open order
    AddToOrder,
    /// Check the open order once
    Status,
    /// Follow the open order until it is paid
    Watch {
        /// Base polling interval in seconds (overrides DINE_POLL_INTERVAL_SECS)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Pay for the open order
    Pay,
    /// Leave feedback on an order
    Feedback {
        text: String,
        /// Order to comment on; defaults to the latest order
        #[arg(long)]
        order: Option<String>,
    },
    /// List past orders
    History,
    /// Sign out and free the table
    Logout,
}

/// Everything a command needs.
pub struct App<S, B>
where
    S: SessionStore + 'static,
    B: RestaurantBackend + 'static,
{
    controller: OrderLifecycleController<S, B>,
    catalog: Catalog<B>,
    feedback: FeedbackService<B>,
    poll_interval: Duration,
}

impl<S, B> App<S, B>
where
    S: SessionStore + 'static,
    B: RestaurantBackend + 'static,
{
    pub fn new(store: Arc<S>, backend: Arc<B>, poll_interval: Duration) -> Self {
        Self {
            controller: OrderLifecycleController::new(store, Arc::clone(&backend)),
            catalog: Catalog::new(Arc::clone(&backend)),
            feedback: FeedbackService::new(backend),
            poll_interval,
        }
    }

    pub fn controller(&self) -> &OrderLifecycleController<S, B> {
        &self.controller
    }

    /// Runs one command, writing its output to stdout.
    pub async fn execute(&self, command: Command) -> ClientResult<()> {
        let customer = self.controller.customer().current_customer();
        self.controller
            .restore(customer.as_ref().map(|c| &c.id))
            .await;

        match command {
            Command::Menu { category } => {
                let dishes = match category {
                    Some(category) => self.catalog.dishes_in_category(&category).await?,
                    None => self.catalog.dishes().await?,
                };
                for dish in dishes {
                    println!(
                        "{:>6}  {:<32} {:>10}  {}",
                        dish.id.as_str(),
                        dish.name,
                        dish.price.to_string(),
                        dish.category.unwrap_or_default()
                    );
                }
            }
            Command::Tables => {
                for table in self.catalog.available_tables().await? {
                    println!("Table {}", table.table_no);
                }
            }
            Command::Login { email, password } => {
                let customer = self.controller.customer().login(&email, &password).await?;
                println!(
                    "Signed in as {}",
                    customer.name.as_deref().unwrap_or(customer.id.as_str())
                );
                if let Some(order) = self.controller.restore(Some(&customer.id)).await {
                    println!("Resuming order {}", order.id);
                }
            }
            Command::Register {
                name,
                email,
                password,
                contact,
            } => {
                let sign_up = NewCustomer::new(&name, &email, &password, contact.as_deref())?;
                let customer = self.controller.customer().register(sign_up).await?;
                println!(
                    "Registered and signed in as {}",
                    customer.name.as_deref().unwrap_or(customer.id.as_str())
                );
            }
            Command::Profile {
                name,
                email,
                contact,
            } => {
                let session = self.controller.customer();
                let profile = if name.is_none() && email.is_none() && contact.is_none() {
                    session.profile().await?
                } else {
                    let update = CustomerUpdate::new(
                        name.as_deref(),
                        email.as_deref(),
                        contact.as_deref(),
                    )?;
                    session.update_profile(update).await?
                };
                print_profile(&profile);
            }
            Command::Sit { table } => {
                self.controller
                    .customer()
                    .assign_table(&TableNo::new(table.clone()))
                    .await?;
                println!("Seated at table {table}");
            }
            Command::Add { dish_id, quantity } => {
                let dish = self
                    .catalog
                    .find_dish(&DishId::new(dish_id.clone()))
                    .await?
                    .ok_or_else(|| ClientError::InvalidInput(format!("No dish {dish_id}")))?;
                println!("Added {quantity} x {}", dish.name);
                self.controller.cart().add_item(dish, quantity);
                print_cart(&self.controller.cart().snapshot());
            }
            Command::Remove { dish_id } => {
                self.controller.cart().remove_item(&DishId::new(dish_id));
                print_cart(&self.controller.cart().snapshot());
            }
            Command::SetQuantity { dish_id, quantity } => {
                self.controller
                    .cart()
                    .update_quantity(&DishId::new(dish_id), quantity);
                print_cart(&self.controller.cart().snapshot());
            }
            Command::Cart => {
                let snapshot = self.controller.snapshot();
                print_cart(&snapshot.cart);
                match (&snapshot.order_ref, snapshot.status) {
                    (Some(order_ref), Some(_)) => {
                        println!("Open order {order_ref}: {}", snapshot.phase);
                    }
                    _ => println!("No open order"),
                }
            }
            Command::Place { table } => {
                let order = self
                    .controller
                    .place_order(PlaceOrder::new(table, None))
                    .await?;
                println!("Order {} placed, total {}", order.id, order.amount);
            }
            Command::AddToOrder => {
                let order_ref = self.controller.add_items_to_open_order().await?;
                println!("Added to order {order_ref}");
            }
            Command::Status => {
                let update = self.controller.refresh_status().await?;
                print_update(&update);
            }
            Command::Watch { interval } => {
                let interval = interval
                    .filter(|&secs| secs > 0)
                    .map(Duration::from_secs)
                    .unwrap_or(self.poll_interval);
                self.watch(interval).await?;
            }
            Command::Pay => {
                let order = self.controller.process_payment().await?;
                println!("Paid {} for order {}. Thank you!", order.amount, order.id);
            }
            Command::Feedback { text, order } => {
                let customer = customer.ok_or(ClientError::NotSignedIn)?;
                let order_ref = match order {
                    Some(order) => OrderRef::new(order),
                    None => self
                        .controller
                        .history()
                        .latest(&customer.id)
                        .await?
                        .map(|order| order.id)
                        .ok_or_else(|| ClientError::InvalidInput("No orders yet".to_string()))?,
                };
                self.feedback.submit(order_ref, customer.id, &text).await?;
                println!("Thanks for the feedback");
            }
            Command::History => {
                let customer = customer.ok_or(ClientError::NotSignedIn)?;
                let history = self.controller.history();
                let orders = history.orders_for(&customer.id).await?;
                for order in &orders {
                    print_order_line(order);
                }
                let summary = ordering::HistorySummary::from_orders(&orders);
                println!(
                    "{} orders, {} open, {} in total",
                    summary.total_orders, summary.open_orders, summary.total_amount
                );
            }
            Command::Logout => {
                self.controller.end_session().await;
                println!("Signed out");
            }
        }
        Ok(())
    }

    async fn watch(&self, interval: Duration) -> ClientResult<()> {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = self.controller.start_polling(
            move |update: &StatusUpdate| {
                let _ = tx.send(update.clone());
            },
            interval,
        )?;

        loop {
            tokio::select! {
                update = rx.recv() => match update {
                    Some(update) => print_update(&update),
                    // The poller dropped the sender: paid, or a check failed.
                    None => break,
                },
                _ = tokio::signal::ctrl_c() => {
                    handle.stop();
                    break;
                }
            }
        }
        Ok(())
    }
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }
    for item in cart.items() {
        println!(
            "{:>3} x {:<32} {:>10}",
            item.quantity,
            item.dish.name,
            item.total_price().to_string()
        );
    }
    println!("Total: {}", cart.total());
}

fn print_profile(customer: &Customer) {
    println!("Customer {}", customer.id);
    println!("  Name:    {}", customer.name.as_deref().unwrap_or("-"));
    println!("  Email:   {}", customer.email.as_deref().unwrap_or("-"));
    println!(
        "  Contact: {}",
        customer.contact_number.as_deref().unwrap_or("-")
    );
}

fn print_update(update: &StatusUpdate) {
    let state = if update.status.is_paid {
        "paid"
    } else if update.status.is_served {
        "served, awaiting payment"
    } else {
        "being prepared"
    };
    println!("Order {}: {state} (total {})", update.order_ref, update.order.amount);
}

fn print_order_line(order: &Order) {
    let placed = match (order.date, order.time) {
        (Some(date), Some(time)) => format!("{date} {}", time.format("%H:%M")),
        (Some(date), None) => date.to_string(),
        _ => "-".to_string(),
    };
    println!(
        "{:<12} {:<17} table {:<4} {:>10}  {}",
        order.id.as_str(),
        placed,
        order.table_no.as_str(),
        order.amount.to_string(),
        order.phase()
    );
}
