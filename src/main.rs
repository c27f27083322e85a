//! stockdesk - a terminal client for the warehouse and hobby service.
//!
//! One process holds one cookie-backed session, so the command shell keeps
//! you signed in across commands and silently renews the session when the
//! server rejects it.

mod api;
mod app;
mod auth;
mod config;
mod forms;
mod models;
mod reports;
mod routes;
mod utils;

use std::io::{self, BufRead, Write};

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use api::ApiError;
use app::{user_message, App};
use auth::CredentialStore;
use forms::{FieldErrors, PostForm, SignInForm, SignUpForm, StockForm, WarehouseForm};
use models::UpdatePost;
use routes::{Navigation, Route};
use utils::format_currency;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("stockdesk starting");

    let mut app = App::new()?;

    if app.try_auto_sign_in().await {
        let session = app.session.get();
        println!("Signed in as {} <{}>", session.username, session.email);
    } else {
        println!("Not signed in. Use `signin` or `signup` to get started.");
    }
    println!("Type `help` for the command list.");

    run_shell(&mut app).await?;

    info!("stockdesk shutting down");
    Ok(())
}

async fn run_shell(app: &mut App) -> Result<()> {
    loop {
        print!("stockdesk> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Ok(()); // EOF
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = parts.split_first() else {
            continue;
        };

        match command {
            "quit" | "exit" => return Ok(()),
            "help" => print_help(),
            "whoami" => cmd_whoami(app),
            "signin" => {
                if let Some(destination) = sign_in_flow(app).await? {
                    show_route(app, destination).await;
                }
            }
            "signup" => sign_up_flow(app).await?,
            "signout" => {
                app.sign_out();
                println!("Signed out.");
            }
            "overview" => {
                if ensure_route(app, Route::Warehouses).await? {
                    cmd_overview(app).await;
                }
            }
            "warehouses" => {
                if ensure_route(app, Route::Warehouses).await? {
                    cmd_warehouses(app).await;
                }
            }
            "add-warehouse" => {
                if ensure_route(app, Route::Warehouses).await? {
                    cmd_add_warehouse(app).await;
                }
            }
            "stocks" => {
                if let Some(id) = parse_id(args, 0, "warehouse id") {
                    if ensure_route(app, Route::WarehouseStocks(id)).await? {
                        cmd_stocks(app, id).await;
                    }
                }
            }
            "add-stock" => {
                if let Some(id) = parse_id(args, 0, "warehouse id") {
                    if ensure_route(app, Route::WarehouseStocks(id)).await? {
                        cmd_add_stock(app, id).await;
                    }
                }
            }
            "update-stock" => {
                if let (Some(warehouse_id), Some(stock_id)) =
                    (parse_id(args, 0, "warehouse id"), parse_id(args, 1, "stock id"))
                {
                    if ensure_route(app, Route::WarehouseStocks(warehouse_id)).await? {
                        cmd_update_stock(app, warehouse_id, stock_id).await;
                    }
                }
            }
            "delete-stock" => {
                if let (Some(warehouse_id), Some(stock_id)) =
                    (parse_id(args, 0, "warehouse id"), parse_id(args, 1, "stock id"))
                {
                    if ensure_route(app, Route::WarehouseStocks(warehouse_id)).await? {
                        cmd_delete_stock(app, warehouse_id, stock_id).await;
                    }
                }
            }
            "report" => {
                if let Some(id) = parse_id(args, 0, "warehouse id") {
                    if ensure_route(app, Route::WarehouseStocks(id)).await? {
                        cmd_report(app, id).await;
                    }
                }
            }
            "report-all" => {
                if ensure_route(app, Route::Warehouses).await? {
                    cmd_report_all(app).await;
                }
            }
            "hobbies" => {
                if ensure_route(app, Route::Hobbies).await? {
                    cmd_hobbies(app).await;
                }
            }
            "hobby" => {
                if let Some(id) = parse_id(args, 0, "hobby id") {
                    if ensure_route(app, Route::Hobby(id)).await? {
                        cmd_hobby(app, id).await;
                    }
                }
            }
            "join" => {
                if let Some(id) = parse_id(args, 0, "hobby id") {
                    if ensure_route(app, Route::Hobbies).await? {
                        cmd_join(app, id).await;
                    }
                }
            }
            "post" => {
                if let Some(id) = parse_id(args, 0, "hobby id") {
                    let content = args[1..].join(" ");
                    if ensure_route(app, Route::Hobby(id)).await? {
                        cmd_post(app, id, content).await;
                    }
                }
            }
            "update-post" => {
                if let (Some(hobby_id), Some(post_id)) =
                    (parse_id(args, 0, "hobby id"), parse_id(args, 1, "post id"))
                {
                    let content = args[2..].join(" ");
                    if ensure_route(app, Route::Hobby(hobby_id)).await? {
                        cmd_update_post(app, hobby_id, post_id, content).await;
                    }
                }
            }
            "delete-post" => {
                if let (Some(hobby_id), Some(post_id)) =
                    (parse_id(args, 0, "hobby id"), parse_id(args, 1, "post id"))
                {
                    if ensure_route(app, Route::Hobby(hobby_id)).await? {
                        cmd_delete_post(app, hobby_id, post_id).await;
                    }
                }
            }
            "profile" => {
                if ensure_route(app, Route::Profile).await? {
                    cmd_profile(app).await;
                }
            }
            other => println!("Unknown command `{}`. Type `help` for the list.", other),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  signin / signup / signout / whoami");
    println!("  overview                              warehouses and hobbies at a glance");
    println!("  warehouses                            list your warehouses");
    println!("  add-warehouse                         create a warehouse");
    println!("  stocks <warehouse-id>                 list stocks in a warehouse");
    println!("  add-stock <warehouse-id>              create a stock");
    println!("  update-stock <warehouse-id> <stock-id>");
    println!("  delete-stock <warehouse-id> <stock-id>");
    println!("  report <warehouse-id>                 save the warehouse stock report");
    println!("  report-all                            save the cross-warehouse report");
    println!("  hobbies                               list hobbies");
    println!("  hobby <hobby-id>                      show a hobby and its posts");
    println!("  join <hobby-id>                       join a hobby");
    println!("  post <hobby-id> <content...>          create a post");
    println!("  update-post <hobby-id> <post-id> <content...>");
    println!("  delete-post <hobby-id> <post-id>");
    println!("  profile                               show your profile");
    println!("  quit");
}

fn parse_id(args: &[&str], index: usize, what: &str) -> Option<i64> {
    match args.get(index).map(|s| s.parse::<i64>()) {
        Some(Ok(id)) => Some(id),
        _ => {
            println!("Expected a numeric {}.", what);
            None
        }
    }
}

/// Route guard check for a command. Returns true when the view may be
/// entered. A refused navigation redirects to the sign-in flow and, once
/// signed in, lands on the remembered view.
async fn ensure_route(app: &mut App, route: Route) -> Result<bool> {
    match app.navigate(route) {
        Navigation::Allowed(_) => {
            tracing::debug!(view = %app.router.current().path(), "entering view");
            Ok(true)
        }
        Navigation::RedirectToSignIn { from } => {
            println!("You need to sign in to open {}.", from.path());
            if let Some(destination) = sign_in_flow(app).await? {
                show_route(app, destination).await;
            }
            Ok(false)
        }
    }
}

/// Render the view a route points at.
async fn show_route(app: &mut App, route: Route) {
    match route {
        Route::Home | Route::SignIn | Route::SignUp => {}
        Route::Hobbies => cmd_hobbies(app).await,
        Route::Hobby(id) => cmd_hobby(app, id).await,
        Route::Profile => cmd_profile(app).await,
        Route::Warehouses => cmd_warehouses(app).await,
        Route::WarehouseStocks(id) => cmd_stocks(app, id).await,
    }
}

// ============================================================================
// Prompt helpers
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_with_default(label: &str, default: &str) -> Result<String> {
    print!("{} [{}]: ", label, default);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let input = input.trim();
    Ok(if input.is_empty() {
        default.to_string()
    } else {
        input.to_string()
    })
}

fn prompt_password(label: &str) -> Result<String> {
    Ok(rpassword::prompt_password(format!("{}: ", label))?)
}

fn print_api_error(error: &ApiError) {
    println!("{}", user_message(error));
    if let Some(details) = error.field_details() {
        let mut errors = FieldErrors::default();
        errors.merge_server(details);
        print!("{}", errors);
    }
}

// ============================================================================
// Authentication flows
// ============================================================================

/// Interactive sign-in. Returns the post-sign-in destination on success.
async fn sign_in_flow(app: &mut App) -> Result<Option<Route>> {
    let email = match app.config.last_email.clone() {
        Some(last) => prompt_with_default("Email", &last)?,
        None => prompt("Email")?,
    };

    let password = if CredentialStore::has_credentials(&email) {
        let reuse = prompt_with_default("Use stored password? (Y/n)", "Y")?;
        if reuse.eq_ignore_ascii_case("n") {
            prompt_password("Password")?
        } else {
            match CredentialStore::get_password(&email) {
                Ok(p) => p,
                Err(_) => prompt_password("Password")?,
            }
        }
    } else {
        prompt_password("Password")?
    };

    let form = SignInForm { email, password };
    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            print!("{}", errors);
            return Ok(None);
        }
    };

    match app.sign_in(&request).await {
        Ok(destination) => {
            let session = app.session.get();
            println!("Signed in as {} <{}>", session.username, session.email);
            Ok(Some(destination))
        }
        Err(e) => {
            print_api_error(&e);
            Ok(None)
        }
    }
}

async fn sign_up_flow(app: &mut App) -> Result<()> {
    let form = SignUpForm {
        email: prompt("Email")?,
        password: prompt_password("Password")?,
        password_confirmation: prompt_password("Confirm your password")?,
    };

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            print!("{}", errors);
            return Ok(());
        }
    };

    match app.sign_up(&request).await {
        Ok(_) => {
            let session = app.session.get();
            println!("Welcome, {}! Your account is ready.", session.username);
        }
        Err(e) => print_api_error(&e),
    }
    Ok(())
}

fn cmd_whoami(app: &App) {
    let session = app.session.get();
    if app.is_authenticated() {
        println!(
            "{} <{}> (profile id {})",
            session.username, session.email, session.user_profile_id
        );
    } else {
        println!("Not signed in.");
    }
}

// ============================================================================
// Warehouse commands
// ============================================================================

async fn cmd_overview(app: &mut App) {
    match app.overview().await {
        Ok((warehouses, hobbies)) => {
            println!("Warehouses: {}", warehouses.len());
            for warehouse in &warehouses {
                println!("  [{}] {} - {}", warehouse.id, warehouse.name, warehouse.address);
            }
            println!("Hobbies: {}", hobbies.len());
            for hobby in &hobbies {
                let joined = if hobby.is_joined { " (joined)" } else { "" };
                println!("  [{}] {}{}", hobby.id, hobby.name, joined);
            }
        }
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_warehouses(app: &mut App) {
    match app.api.warehouses().await {
        Ok(warehouses) => {
            if warehouses.is_empty() {
                println!("No warehouses yet. Use `add-warehouse` to create one.");
                return;
            }
            println!("Your Warehouses");
            for warehouse in &warehouses {
                println!("  [{}] {} - {}", warehouse.id, warehouse.name, warehouse.address);
            }
        }
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_add_warehouse(app: &mut App) {
    let form = match (prompt("Name"), prompt("Address")) {
        (Ok(name), Ok(address)) => WarehouseForm { name, address },
        _ => return,
    };

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            print!("{}", errors);
            return;
        }
    };

    match app.api.create_warehouse(&request).await {
        Ok(warehouses) => {
            println!("Warehouse created. You now have {}.", warehouses.len());
        }
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_stocks(app: &mut App, warehouse_id: i64) {
    match app.api.warehouse_stocks(warehouse_id).await {
        Ok(payload) => print_stocks(&payload),
        Err(e) => print_api_error(&e),
    }
}

fn print_stocks(payload: &models::WarehouseStocksPayload) {
    println!("Your stocks in the {} warehouse", payload.warehouse.name);
    if payload.stocks.is_empty() {
        println!("  (no stocks)");
        return;
    }
    for stock in &payload.stocks {
        println!(
            "  [{}] {} from {} - qty {} @ {} = {} (bought {}, due {})",
            stock.id,
            stock.name,
            stock.supplier,
            stock.quantity,
            stock.display_cost_price(),
            stock.display_amount(),
            stock.display_purchase_date(),
            stock.display_due_date(),
        );
    }
    println!(
        "  Total: {}",
        format_currency(reports::total_spent(&payload.stocks))
    );
}

fn prompt_stock_form() -> Result<StockForm> {
    Ok(StockForm {
        name: prompt("Name")?,
        supplier: prompt("Supplier")?,
        quantity: prompt("Quantity")?,
        cost_price: prompt("Cost price")?,
        purchase_date: prompt("Purchase date (YYYY-MM-DD)")?,
        stock_due_date: prompt("Stock due date (YYYY-MM-DD)")?,
    })
}

async fn cmd_add_stock(app: &mut App, warehouse_id: i64) {
    let Ok(form) = prompt_stock_form() else {
        return;
    };
    let request = match form.validate_new(warehouse_id) {
        Ok(request) => request,
        Err(errors) => {
            print!("{}", errors);
            return;
        }
    };

    match app.api.create_stock(&request).await {
        Ok(payload) => print_stocks(&payload),
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_update_stock(app: &mut App, warehouse_id: i64, stock_id: i64) {
    let Ok(form) = prompt_stock_form() else {
        return;
    };
    let request = match form.validate_update(warehouse_id) {
        Ok(request) => request,
        Err(errors) => {
            print!("{}", errors);
            return;
        }
    };

    if let Err(e) = app.api.update_stock(stock_id, &request).await {
        print_api_error(&e);
        return;
    }

    // Show the list as the server now has it
    match app.api.warehouse_stocks(warehouse_id).await {
        Ok(payload) => print_stocks(&payload),
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_delete_stock(app: &mut App, warehouse_id: i64, stock_id: i64) {
    match app.delete_stock_confirmed(stock_id, warehouse_id).await {
        Ok(payload) => {
            println!("Stock {} deleted.", stock_id);
            print_stocks(&payload);
        }
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_report(app: &mut App, warehouse_id: i64) {
    match app.save_stock_report(warehouse_id).await {
        Ok(path) => println!("Report saved to {}", path.display()),
        Err(e) => println!("{}", e),
    }
}

async fn cmd_report_all(app: &mut App) {
    match app.save_warehouses_report().await {
        Ok(path) => println!("Report saved to {}", path.display()),
        Err(e) => println!("{}", e),
    }
}

// ============================================================================
// Hobby commands
// ============================================================================

async fn cmd_hobbies(app: &mut App) {
    match app.api.hobbies().await {
        Ok(hobbies) => {
            for hobby in &hobbies {
                let joined = if hobby.is_joined { " (joined)" } else { "" };
                println!("  [{}] {}{}", hobby.id, hobby.name, joined);
                if let Some(ref description) = hobby.description {
                    println!("      {}", description);
                }
            }
        }
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_hobby(app: &mut App, hobby_id: i64) {
    match app.api.hobby(hobby_id).await {
        Ok(hobby) => print_hobby(app, &hobby),
        Err(e) => print_api_error(&e),
    }
}

fn print_hobby(app: &App, hobby: &models::HobbyDetail) {
    let joined = if hobby.is_joined { " (joined)" } else { "" };
    println!("{}{}", hobby.name, joined);
    if let Some(ref description) = hobby.description {
        println!("{}", description);
    }

    if hobby.posts.is_empty() {
        println!("No posts yet...");
        return;
    }
    let my_profile_id = app.session.get().user_profile_id;
    for post in &hobby.posts {
        let mine = if post.is_owned_by(my_profile_id) {
            " (yours)"
        } else {
            ""
        };
        println!(
            "  [{}] {} on {}{}: {}",
            post.id,
            post.user.username,
            post.display_created_at(),
            mine,
            post.content
        );
    }
}

async fn cmd_join(app: &mut App, hobby_id: i64) {
    match app.api.join_hobby(hobby_id).await {
        Ok(()) => println!("Joined."),
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_post(app: &mut App, hobby_id: i64, content: String) {
    let form = PostForm { content };
    let request = match form.validate(hobby_id) {
        Ok(request) => request,
        Err(errors) => {
            print!("{}", errors);
            return;
        }
    };

    if let Err(e) = app.api.create_post(&request).await {
        print_api_error(&e);
        return;
    }
    match app.api.hobby(hobby_id).await {
        Ok(hobby) => print_hobby(app, &hobby),
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_update_post(app: &mut App, hobby_id: i64, post_id: i64, content: String) {
    let request = UpdatePost { content, hobby_id };
    if let Err(e) = app.api.update_post(post_id, &request).await {
        print_api_error(&e);
        return;
    }
    match app.api.hobby(hobby_id).await {
        Ok(hobby) => print_hobby(app, &hobby),
        Err(e) => print_api_error(&e),
    }
}

async fn cmd_delete_post(app: &mut App, hobby_id: i64, post_id: i64) {
    match app.delete_post_confirmed(post_id, hobby_id).await {
        Ok(hobby) => {
            println!("Post {} deleted.", post_id);
            print_hobby(app, &hobby);
        }
        Err(e) => print_api_error(&e),
    }
}

// ============================================================================
// Profile
// ============================================================================

async fn cmd_profile(app: &mut App) {
    let session = app.session.get();
    println!("Hi! {}", session.username);

    match app.api.profile(session.user_profile_id).await {
        Ok(profile) => {
            if let Some(ref full_name) = profile.full_name {
                println!("  {}", full_name);
            }
            if let Some(ref bio) = profile.bio {
                println!("  {}", bio);
            }
            if let Some(ref sosmed) = profile.sosmed {
                for (label, link) in [
                    ("instagram", &sosmed.instagram),
                    ("tiktok", &sosmed.tiktok),
                    ("linkedin", &sosmed.linkedin),
                    ("website", &sosmed.website),
                ] {
                    if let Some(link) = link {
                        println!("  {}: {}", label, link);
                    }
                }
            }
            println!("My Hobbies");
            if profile.hobbies.is_empty() {
                println!("  (none yet - try `hobbies` and `join`)");
            }
            for hobby in &profile.hobbies {
                println!("  [{}] {}", hobby.id, hobby.name);
            }
        }
        Err(e) => print_api_error(&e),
    }
}
