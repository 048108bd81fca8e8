//! waypool CLI - a command-line client for the carpooling marketplace.
//!
//! Thin frontend over `waypool-core`: every command restores the
//! persisted session first, then talks to the API through the shared
//! client. Session state never lives here.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use waypool_core::models::{
    ChatMessage, CreateTripRequest, LoginCredentials, RegisterCredentials, Reservation, Trip,
    TripFilters,
};
use waypool_core::{open_store, ApiClient, AuthManager, Config, Platform};

const USAGE: &str = "waypool - carpooling marketplace client

Usage: waypool <command> [options]

Session:
  login                     Sign in with email and password
  register                  Create an account and sign in
  logout                    Sign out and clear the stored session
  status                    Show the current session
  profile                   Fetch the signed-in profile from the server
  validate                  Check the stored token against the server

Trips:
  trips [--from X] [--to Y] [--date YYYY-MM-DD] [--status S]
                            Search published trips
  publish                   Publish a new trip (interactive)

Reservations:
  reserve <trip-id>         Reserve a seat on a trip
  reservations <trip-id>    List reservations for one of your trips
  accept <reservation-id>   Accept a pending reservation
  reject <reservation-id>   Reject a pending reservation
  upcoming                  List your upcoming reservations

Messages:
  messages <trip-id> <user-id>
                            Show the conversation for a trip
  send <trip-id> <user-id> <text...>
                            Send a message

Environment:
  WAYPOOL_API_URL           API base URL (default http://localhost:3000/api)
  WAYPOOL_DATA_DIR          Override the local data directory
  RUST_LOG                  Log filter (e.g. RUST_LOG=debug)";

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

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };

    if matches!(command, "help" | "--help" | "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::from_env()?;
    info!(api_url = %config.api_url, "waypool starting");

    let store = open_store(Platform::detect(), &config.data_dir)?;
    let client = ApiClient::new(&config, store.clone())?;
    let manager = AuthManager::new(store, Arc::new(client.clone()));

    // Rehydrate before dispatching so every command sees the stored session
    manager.restore().await;

    match command {
        "login" => login(&manager).await?,
        "register" => register(&manager).await?,
        "logout" => logout(&manager).await,
        "status" => status(&manager),
        "profile" => profile(&manager, &client).await?,
        "validate" => validate(&manager, &client).await?,
        "trips" => trips(&client, &args[1..]).await?,
        "publish" => publish(&manager, &client).await?,
        "reserve" => reserve(&manager, &client, &args[1..]).await?,
        "reservations" => reservations(&manager, &client, &args[1..]).await?,
        "accept" => accept(&manager, &client, &args[1..]).await?,
        "reject" => reject(&manager, &client, &args[1..]).await?,
        "upcoming" => upcoming(&manager, &client).await?,
        "messages" => messages(&manager, &client, &args[1..]).await?,
        "send" => send(&manager, &client, &args[1..]).await?,
        _ => {
            eprintln!("Unknown command: {}\n", command);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    }

    Ok(())
}

// ============================================================================
// Session commands
// ============================================================================

async fn login(manager: &AuthManager) -> Result<()> {
    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ")?;

    manager.login(LoginCredentials { email, password }).await;

    let state = manager.state();
    if let Some(user) = state.user {
        println!("Signed in as {} <{}>", user.name, user.email);
        Ok(())
    } else {
        let reason = state.error.unwrap_or_else(|| "Unknown error".to_string());
        anyhow::bail!("Login failed: {}", reason);
    }
}

async fn register(manager: &AuthManager) -> Result<()> {
    let name = prompt("Name: ")?;
    let email = prompt("Email: ")?;
    let password = rpassword::prompt_password("Password: ")?;
    let confirm_password = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm_password {
        anyhow::bail!("Passwords do not match");
    }

    manager
        .register(RegisterCredentials {
            name,
            email,
            password,
            confirm_password,
        })
        .await;

    let state = manager.state();
    if let Some(user) = state.user {
        println!("Account created. Signed in as {} <{}>", user.name, user.email);
        Ok(())
    } else {
        let reason = state.error.unwrap_or_else(|| "Unknown error".to_string());
        anyhow::bail!("Registration failed: {}", reason);
    }
}

async fn logout(manager: &AuthManager) {
    manager.logout().await;
    println!("Signed out.");
}

fn status(manager: &AuthManager) {
    let state = manager.state();
    match state.user {
        Some(user) => println!("Signed in as {} <{}>", user.name, user.email),
        None => println!("Signed out."),
    }
    if let Some(error) = state.error {
        eprintln!("Last error: {}", error);
    }
}

async fn profile(manager: &AuthManager, client: &ApiClient) -> Result<()> {
    require_session(manager)?;
    let user = client.fetch_profile().await?;
    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}

async fn validate(manager: &AuthManager, client: &ApiClient) -> Result<()> {
    require_session(manager)?;
    if client.validate_token().await {
        println!("Token is valid.");
        Ok(())
    } else {
        anyhow::bail!("Token is invalid or expired");
    }
}

// ============================================================================
// Trip commands
// ============================================================================

async fn trips(client: &ApiClient, args: &[String]) -> Result<()> {
    let mut filters = TripFilters::default();
    let mut args = args.iter();
    while let Some(flag) = args.next() {
        let value = args
            .next()
            .ok_or_else(|| anyhow::anyhow!("Missing value for {}", flag))?;
        match flag.as_str() {
            "--from" => filters.origin = Some(value.clone()),
            "--to" => filters.destination = Some(value.clone()),
            "--date" => filters.date = Some(value.parse()?),
            "--status" => filters.status = Some(value.clone()),
            _ => anyhow::bail!("Unknown option: {}", flag),
        }
    }

    let trips = client.search_trips(&filters).await?;
    if trips.is_empty() {
        println!("No trips found.");
        return Ok(());
    }
    for trip in &trips {
        print_trip(trip);
    }
    Ok(())
}

async fn publish(manager: &AuthManager, client: &ApiClient) -> Result<()> {
    require_session(manager)?;

    let origin = prompt("Origin: ")?;
    let destination = prompt("Destination: ")?;
    let departure = prompt("Departure (e.g. 2026-09-01T08:30:00Z): ")?;
    let price = prompt("Price per seat: ")?;
    let seats = prompt("Total seats: ")?;

    let request = CreateTripRequest {
        origin,
        destination,
        departure_time: departure,
        price_per_seat: price.parse()?,
        total_seats: seats.parse()?,
        available_seats: None,
        status: None,
    };

    let trip = client.create_trip(&request).await?;
    println!("Published trip {}:", trip.id);
    print_trip(&trip);
    Ok(())
}

// ============================================================================
// Reservation commands
// ============================================================================

async fn reserve(manager: &AuthManager, client: &ApiClient, args: &[String]) -> Result<()> {
    require_session(manager)?;
    let [trip_id] = args else {
        anyhow::bail!("Usage: waypool reserve <trip-id>");
    };

    let reservation = client.reserve_seat(trip_id).await?;
    println!("Reservation requested:");
    print_reservation(&reservation);
    Ok(())
}

async fn reservations(manager: &AuthManager, client: &ApiClient, args: &[String]) -> Result<()> {
    require_session(manager)?;
    let [trip_id] = args else {
        anyhow::bail!("Usage: waypool reservations <trip-id>");
    };

    let reservations = client.trip_reservations(trip_id).await?;
    if reservations.is_empty() {
        println!("No reservations for this trip.");
        return Ok(());
    }
    for reservation in &reservations {
        print_reservation(reservation);
    }
    Ok(())
}

async fn accept(manager: &AuthManager, client: &ApiClient, args: &[String]) -> Result<()> {
    require_session(manager)?;
    let [reservation_id] = args else {
        anyhow::bail!("Usage: waypool accept <reservation-id>");
    };

    let reservation = client.accept_reservation(reservation_id).await?;
    print_reservation(&reservation);
    Ok(())
}

async fn reject(manager: &AuthManager, client: &ApiClient, args: &[String]) -> Result<()> {
    require_session(manager)?;
    let [reservation_id] = args else {
        anyhow::bail!("Usage: waypool reject <reservation-id>");
    };

    let reservation = client.reject_reservation(reservation_id).await?;
    print_reservation(&reservation);
    Ok(())
}

async fn upcoming(manager: &AuthManager, client: &ApiClient) -> Result<()> {
    require_session(manager)?;
    let reservations = client.upcoming_reservations().await?;
    if reservations.is_empty() {
        println!("No upcoming reservations.");
        return Ok(());
    }
    for reservation in &reservations {
        print_reservation(reservation);
    }
    Ok(())
}

// ============================================================================
// Message commands
// ============================================================================

async fn messages(manager: &AuthManager, client: &ApiClient, args: &[String]) -> Result<()> {
    require_session(manager)?;
    let [trip_id, other_user_id] = args else {
        anyhow::bail!("Usage: waypool messages <trip-id> <user-id>");
    };

    let messages = client
        .messages(trip_id.parse()?, other_user_id.parse()?)
        .await?;
    if messages.is_empty() {
        println!("No messages yet.");
        return Ok(());
    }
    for message in &messages {
        print_message(message);
    }
    Ok(())
}

async fn send(manager: &AuthManager, client: &ApiClient, args: &[String]) -> Result<()> {
    require_session(manager)?;
    let [trip_id, receiver_id, text @ ..] = args else {
        anyhow::bail!("Usage: waypool send <trip-id> <user-id> <text...>");
    };
    if text.is_empty() {
        anyhow::bail!("Usage: waypool send <trip-id> <user-id> <text...>");
    }

    let message = client
        .send_message(trip_id.parse()?, receiver_id.parse()?, &text.join(" "))
        .await?;
    print_message(&message);
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn require_session(manager: &AuthManager) -> Result<()> {
    if manager.state().is_authenticated {
        Ok(())
    } else {
        anyhow::bail!("Not signed in. Run 'waypool login' first.");
    }
}

/// Read one trimmed line from stdin after printing a label
fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn print_trip(trip: &Trip) {
    println!(
        "{}  {} -> {}  {}  {:.2}/seat  {}/{} seats free  [{}]  driver: {}",
        trip.id,
        trip.origin,
        trip.destination,
        trip.departure_time,
        trip.price_per_seat,
        trip.available_seats,
        trip.total_seats,
        trip.status,
        trip.driver.name,
    );
}

fn print_reservation(reservation: &Reservation) {
    let route = reservation
        .trip
        .as_ref()
        .map(|t| format!("{} -> {} on {}", t.origin, t.destination, t.departure_time))
        .unwrap_or_else(|| "(trip unavailable)".to_string());
    let role = reservation
        .role
        .as_deref()
        .map(|r| format!("  as {}", r))
        .unwrap_or_default();
    println!("#{}  {}  {}{}", reservation.id, reservation.status, route, role);
}

fn print_message(message: &ChatMessage) {
    let when = message
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    println!(
        "[{}] {} -> {}: {}",
        when, message.sender_id, message.receiver_id, message.content
    );
}
