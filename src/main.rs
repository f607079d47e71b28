use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};

use society::billing::{
    bill_overview, create_bill, default_due_date, default_title, defaulters, list_bills,
    month_of, payment_history, record_payment, resident_dues, resolve_bill, BillForm, PaymentForm,
};
use society::board::{
    advance_complaint, delete_complaint, delete_notice, file_complaint, list_complaints,
    list_notices, post_notice, set_complaint_status,
};
use society::config::{
    clear_session, clear_user, data_dir, ensure_initialized, load_config, load_session,
    save_society, save_user, CONFIG_TEMPLATE,
};
use society::format::{format_date, format_money, format_timestamp};
use society::residents::{
    add_society, add_vehicle, find_society, find_vehicle, list_societies, list_vehicles, log_in,
    profile, remove_vehicle, set_role, sign_up, update_profile, ProfileChanges, SignUpForm,
    VehicleForm,
};
use society::store::{
    BillStatus, ComplaintStatus, NoticeType, PaymentMethod, Role, Society, VehicleType,
};
use society::{init_tracing, Actor, Config, Result, SocietyError, Store};

#[derive(Parser)]
#[command(name = "society")]
#[command(version, about = "Residential society management from the command line", long_about = None)]
struct Cli {
    /// Path to data directory (default: ~/.society or XDG config)
    #[arg(short = 'C', long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory with a config template
    Init,

    /// List registered societies
    Societies,

    /// Register a new society
    AddSociety {
        name: String,

        #[arg(long, default_value = "")]
        address: String,

        #[arg(long, default_value = "")]
        city: String,
    },

    /// Appoint a member of the selected society as chairman, secretary or resident
    SetRole {
        /// Member's email address
        email: String,

        /// resident, chairman or secretary
        role: String,
    },

    /// Choose the society to work in (id or name)
    Select { society: String },

    /// Create an account in the selected society
    Signup {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        /// Flat number, e.g. A-101
        #[arg(long)]
        flat: String,

        #[arg(long)]
        password: String,

        #[arg(long = "confirm-password")]
        confirm_password: String,
    },

    /// Log in to the selected society
    Login {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Forget the saved session
    Logout,

    /// Show the selected society and signed-in member
    Status,

    /// Show your profile
    Profile,

    /// Change your profile details
    EditProfile {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        flat: Option<String>,
    },

    /// List your vehicles
    Vehicles,

    /// Register a vehicle
    AddVehicle {
        /// Number plate, e.g. MH12AB1234
        plate: String,

        /// 2-wheeler, 4-wheeler, auto or commercial
        #[arg(short = 't', long = "type")]
        vehicle_type: String,

        #[arg(long, default_value = "")]
        color: String,

        #[arg(long, default_value = "")]
        brand: String,

        #[arg(long, default_value = "")]
        model: String,
    },

    /// Remove a registered vehicle
    RemoveVehicle { id: u64 },

    /// Find who owns a vehicle in this society
    FindVehicle { plate: String },

    /// Show the notice board
    Notices,

    /// Post a notice
    PostNotice {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// general, urgent or maintenance
        #[arg(short = 't', long = "type", default_value = "general")]
        notice_type: String,
    },

    /// Delete a notice
    DeleteNotice { id: u64 },

    /// List complaints
    Complaints {
        /// Only show complaints with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// File a complaint
    FileComplaint {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,
    },

    /// Move a complaint to its next status
    AdvanceComplaint {
        id: u64,

        /// Target status; must be the next step (default: next step)
        #[arg(long)]
        to: Option<String>,
    },

    /// Delete a complaint
    DeleteComplaint { id: u64 },

    /// List maintenance bills
    Bills,

    /// Bill every flat, carrying forward outstanding balances
    CreateBill {
        /// Default charge per flat
        amount: f64,

        /// Bill month as YYYY-MM (default: current month)
        #[arg(long)]
        month: Option<String>,

        /// Due date as YYYY-MM-DD (default: configured due day of the month)
        #[arg(long)]
        due: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(long, default_value = "")]
        description: String,
    },

    /// Record a payment received from a flat
    RecordPayment {
        /// Flat number
        flat: String,

        amount: f64,

        /// Bill id (default: latest bill)
        #[arg(long)]
        bill: Option<u64>,

        /// cash, upi, cheque, bank_transfer or neft
        #[arg(long, default_value = "cash")]
        method: String,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,

        #[arg(long, default_value = "")]
        reference: String,

        #[arg(long, default_value = "")]
        remarks: String,
    },

    /// Society-wide payment history
    Payments {
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Your flat's current bill and payments
    MyDues,

    /// Flats that have not paid a bill in full
    Defaulters {
        /// Bill id (default: latest bill)
        #[arg(long)]
        bill: Option<u64>,
    },

    /// Collection summary for a bill
    Overview {
        /// Bill id (default: latest bill)
        #[arg(long)]
        bill: Option<u64>,
    },
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let dir = match cli.data_dir {
        Some(p) => p,
        None => data_dir()?,
    };
    let dir = dir.as_path();

    match cli.command {
        Commands::Init => cmd_init(dir),
        Commands::Societies => cmd_societies(dir),
        Commands::AddSociety {
            name,
            address,
            city,
        } => cmd_add_society(dir, &name, &address, &city),
        Commands::SetRole { email, role } => cmd_set_role(dir, &email, &role),
        Commands::Select { society } => cmd_select(dir, &society),
        Commands::Signup {
            name,
            email,
            phone,
            flat,
            password,
            confirm_password,
        } => cmd_signup(
            dir,
            SignUpForm {
                name,
                email,
                phone,
                flat_number: flat,
                password,
                confirm_password,
            },
        ),
        Commands::Login { email, password } => cmd_login(dir, &email, &password),
        Commands::Logout => cmd_logout(dir),
        Commands::Status => cmd_status(dir),
        Commands::Profile => cmd_profile(dir),
        Commands::EditProfile {
            name,
            email,
            phone,
            flat,
        } => cmd_edit_profile(
            dir,
            ProfileChanges {
                name,
                email,
                phone,
                flat_number: flat,
            },
        ),
        Commands::Vehicles => cmd_vehicles(dir),
        Commands::AddVehicle {
            plate,
            vehicle_type,
            color,
            brand,
            model,
        } => cmd_add_vehicle(dir, plate, &vehicle_type, color, brand, model),
        Commands::RemoveVehicle { id } => cmd_remove_vehicle(dir, id),
        Commands::FindVehicle { plate } => cmd_find_vehicle(dir, &plate),
        Commands::Notices => cmd_notices(dir),
        Commands::PostNotice {
            title,
            description,
            notice_type,
        } => cmd_post_notice(dir, &title, &description, &notice_type),
        Commands::DeleteNotice { id } => cmd_delete_notice(dir, id),
        Commands::Complaints { status } => cmd_complaints(dir, status.as_deref()),
        Commands::FileComplaint { title, description } => {
            cmd_file_complaint(dir, &title, &description)
        }
        Commands::AdvanceComplaint { id, to } => cmd_advance_complaint(dir, id, to.as_deref()),
        Commands::DeleteComplaint { id } => cmd_delete_complaint(dir, id),
        Commands::Bills => cmd_bills(dir),
        Commands::CreateBill {
            amount,
            month,
            due,
            title,
            description,
        } => cmd_create_bill(dir, amount, month, due, title, description),
        Commands::RecordPayment {
            flat,
            amount,
            bill,
            method,
            date,
            reference,
            remarks,
        } => cmd_record_payment(dir, flat, amount, bill, &method, date, reference, remarks),
        Commands::Payments { limit } => cmd_payments(dir, limit),
        Commands::MyDues => cmd_my_dues(dir),
        Commands::Defaulters { bill } => cmd_defaulters(dir, bill),
        Commands::Overview { bill } => cmd_overview(dir, bill),
    }
}

/// Open config and store of an initialized data directory.
fn open(dir: &Path) -> Result<(Config, Store)> {
    ensure_initialized(dir)?;
    let config = load_config(dir)?;
    let store = Store::open(dir)?;
    Ok((config, store))
}

/// The selected society, re-read from the store.
fn selected_society(dir: &Path, store: &Store) -> Result<Society> {
    let session = load_session(dir)?;
    let saved = session.society.ok_or(SocietyError::NoSocietySelected)?;
    Ok(store.db().society(saved.id)?.clone())
}

/// The signed-in member. The role is always re-read from the store by the
/// operations themselves; only the ids come from the session.
fn signed_in(dir: &Path) -> Result<Actor> {
    let session = load_session(dir)?;
    let user = session.user.ok_or(SocietyError::NotLoggedIn)?;
    Ok(Actor::of(&user))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| SocietyError::InvalidDate(input.to_string()))
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Initialize data directory with the config template
fn cmd_init(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Err(SocietyError::AlreadyInitialized(dir.to_path_buf()));
    }

    fs::create_dir_all(dir)?;
    fs::write(dir.join("config.toml"), CONFIG_TEMPLATE)?;

    println!("Initialized society data at: {}", dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Register a society:  society add-society \"<name>\" --city <city>");
    println!("  2. Select it:           society select <id>");
    println!("  3. Create an account:   society signup --name ... --flat A-101 ...");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct SocietyRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CITY")]
    city: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
}

#[derive(Tabled)]
struct VehicleRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "PLATE")]
    plate: String,
    #[tabled(rename = "TYPE")]
    vehicle_type: String,
    #[tabled(rename = "COLOR")]
    color: String,
    #[tabled(rename = "BRAND")]
    brand: String,
    #[tabled(rename = "MODEL")]
    model: String,
}

#[derive(Tabled)]
struct NoticeRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "POSTED")]
    posted: String,
    #[tabled(rename = "TYPE")]
    notice_type: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "BY")]
    author: String,
}

#[derive(Tabled)]
struct ComplaintRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "FILED")]
    filed: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "BY")]
    filed_by: String,
}

#[derive(Tabled)]
struct BillRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "MONTH")]
    month: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "DUE")]
    due: String,
}

#[derive(Tabled)]
struct FlatBillRow {
    #[tabled(rename = "FLAT")]
    flat: String,
    #[tabled(rename = "CHARGE")]
    charge: String,
    #[tabled(rename = "AMOUNT DUE")]
    adjusted: String,
    #[tabled(rename = "STATUS")]
    status: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "FLAT")]
    flat: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "BILL")]
    bill: String,
    #[tabled(rename = "REFERENCE")]
    reference: String,
}

#[derive(Tabled)]
struct DefaulterRow {
    #[tabled(rename = "FLAT")]
    flat: String,
    #[tabled(rename = "DUE")]
    due: String,
    #[tabled(rename = "PAID")]
    paid: String,
    #[tabled(rename = "BALANCE")]
    balance: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "RESIDENTS")]
    residents: String,
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");
}

/// List registered societies
fn cmd_societies(dir: &Path) -> Result<()> {
    let (_, store) = open(dir)?;
    let societies = list_societies(store.db());

    if societies.is_empty() {
        println!("No societies registered.");
        println!("Add one with: society add-society \"<name>\"");
        return Ok(());
    }

    let rows: Vec<SocietyRow> = societies
        .iter()
        .map(|s| SocietyRow {
            id: s.id,
            name: s.name.clone(),
            city: s.city.clone(),
            address: s.address.clone(),
        })
        .collect();
    print_table(rows);

    Ok(())
}

fn cmd_add_society(dir: &Path, name: &str, address: &str, city: &str) -> Result<()> {
    let (_, mut store) = open(dir)?;
    let society = add_society(&mut store, name, address, city)?;
    println!("Added society {} ({})", society.name, society.id);
    Ok(())
}

fn cmd_set_role(dir: &Path, email: &str, role: &str) -> Result<()> {
    let role: Role = role.parse()?;
    let (_, mut store) = open(dir)?;
    let society = selected_society(dir, &store)?;
    let user = set_role(&mut store, society.id, email, role)?;
    println!("{} is now {} of {}", user.name, user.role, society.name);
    Ok(())
}

/// Select a society; a saved login for another society is dropped
fn cmd_select(dir: &Path, reference: &str) -> Result<()> {
    let (_, store) = open(dir)?;
    let society = find_society(store.db(), reference)?;

    save_society(dir, society)?;
    let session = load_session(dir)?;
    if session
        .user
        .as_ref()
        .is_some_and(|u| u.society_id != society.id)
    {
        clear_user(dir)?;
    }

    println!("Selected {} ({})", society.name, society.id);
    Ok(())
}

fn cmd_signup(dir: &Path, form: SignUpForm) -> Result<()> {
    let (config, mut store) = open(dir)?;
    let society = selected_society(dir, &store)?;
    let user = sign_up(&mut store, society.id, &form, config.auth.min_password_length)?;
    println!(
        "Account created for {} (flat {}) in {}",
        user.name, user.flat_number, society.name
    );
    println!("Log in with: society login --email {}", user.email);
    Ok(())
}

fn cmd_login(dir: &Path, email: &str, password: &str) -> Result<()> {
    let (_, store) = open(dir)?;
    let society = selected_society(dir, &store)?;
    let user = log_in(store.db(), society.id, email, password)?;

    save_user(dir, &user)?;
    save_society(dir, &society)?;

    println!("Welcome, {} ({}, flat {})", user.name, user.role, user.flat_number);
    Ok(())
}

fn cmd_logout(dir: &Path) -> Result<()> {
    ensure_initialized(dir)?;
    clear_session(dir)?;
    println!("Logged out.");
    Ok(())
}

/// Show the current session
fn cmd_status(dir: &Path) -> Result<()> {
    let (_, store) = open(dir)?;
    let session = load_session(dir)?;

    println!("Society Status");
    println!("{}", "-".repeat(50));
    println!("Data directory: {}", dir.display());

    let society = session
        .society
        .as_ref()
        .and_then(|s| store.db().society(s.id).ok());
    match society {
        Some(s) => println!("Society:        {} ({})", s.name, s.id),
        None => println!("Society:        (none selected)"),
    }

    let user = session.user.as_ref().and_then(|u| store.db().user(u.id).ok());
    match user {
        Some(u) => {
            println!("Logged in as:   {} <{}>", u.name, u.email);
            println!("Flat:           {}", u.flat_number);
            println!("Role:           {}", u.role);
        }
        None => println!("Logged in as:   (not logged in)"),
    }

    Ok(())
}

fn cmd_profile(dir: &Path) -> Result<()> {
    let (_, store) = open(dir)?;
    let actor = signed_in(dir)?;
    let p = profile(store.db(), actor)?;

    println!("Name:    {}", p.user.name);
    println!("Email:   {}", p.user.email);
    println!("Phone:   {}", p.user.phone);
    println!("Flat:    {}", p.flat.flat_number);
    println!("Role:    {}", p.user.role);
    println!("Society: {}", p.society.name);
    if !p.society.city.is_empty() {
        println!("City:    {}", p.society.city);
    }
    Ok(())
}

fn cmd_edit_profile(dir: &Path, changes: ProfileChanges) -> Result<()> {
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let user = update_profile(&mut store, actor, &changes)?;
    save_user(dir, &user)?;
    println!("Profile updated: {} <{}>, flat {}", user.name, user.email, user.flat_number);
    Ok(())
}

/// List the signed-in member's vehicles
fn cmd_vehicles(dir: &Path) -> Result<()> {
    let (_, store) = open(dir)?;
    let actor = signed_in(dir)?;
    let vehicles = list_vehicles(store.db(), actor)?;

    if vehicles.is_empty() {
        println!("No vehicles registered.");
        return Ok(());
    }

    let rows: Vec<VehicleRow> = vehicles
        .iter()
        .map(|v| VehicleRow {
            id: v.id,
            plate: v.number_plate.clone(),
            vehicle_type: v.vehicle_type.to_string(),
            color: v.color.clone(),
            brand: v.brand.clone(),
            model: v.model.clone(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_add_vehicle(
    dir: &Path,
    number_plate: String,
    vehicle_type: &str,
    color: String,
    brand: String,
    model: String,
) -> Result<()> {
    let vehicle_type: VehicleType = vehicle_type.parse()?;
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let form = VehicleForm {
        number_plate,
        vehicle_type,
        color,
        brand,
        model,
    };
    let vehicle = add_vehicle(&mut store, actor, &form)?;
    println!("Registered {} ({})", vehicle.number_plate, vehicle.vehicle_type);
    Ok(())
}

fn cmd_remove_vehicle(dir: &Path, id: u64) -> Result<()> {
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let vehicle = remove_vehicle(&mut store, actor, id)?;
    println!("Removed {}", vehicle.number_plate);
    Ok(())
}

fn cmd_find_vehicle(dir: &Path, plate: &str) -> Result<()> {
    let (_, store) = open(dir)?;
    let actor = signed_in(dir)?;
    actor.member(store.db())?;
    let found = find_vehicle(store.db(), actor.society_id, plate)?;

    println!("Plate:   {}", found.vehicle.number_plate);
    println!("Type:    {}", found.vehicle.vehicle_type);
    let details = [
        found.vehicle.color.as_str(),
        found.vehicle.brand.as_str(),
        found.vehicle.model.as_str(),
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .copied()
    .collect::<Vec<_>>()
    .join(" ");
    if !details.is_empty() {
        println!("Vehicle: {details}");
    }
    if let Some(flat) = found.flat_number {
        println!("Flat:    {flat}");
    }
    if let Some(owner) = found.owner {
        println!("Owner:   {}", owner.name);
        println!("Phone:   {}", owner.phone);
        println!("Email:   {}", owner.email);
    }
    Ok(())
}

fn cmd_notices(dir: &Path) -> Result<()> {
    let (_, store) = open(dir)?;
    let actor = signed_in(dir)?;
    actor.member(store.db())?;
    let notices = list_notices(store.db(), actor.society_id);

    if notices.is_empty() {
        println!("No notices posted.");
        return Ok(());
    }

    let rows: Vec<NoticeRow> = notices
        .iter()
        .map(|n| NoticeRow {
            id: n.notice.id,
            posted: format_timestamp(n.notice.created_at),
            notice_type: n.notice.notice_type.to_string(),
            title: n.notice.title.clone(),
            description: n.notice.description.clone(),
            author: n
                .author
                .map(|u| format!("{} ({}, {})", u.name, u.flat_number, u.role))
                .unwrap_or_default(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_post_notice(dir: &Path, title: &str, description: &str, notice_type: &str) -> Result<()> {
    let notice_type: NoticeType = notice_type.parse()?;
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let notice = post_notice(&mut store, actor, title, description, notice_type)?;
    println!("Posted {} notice {}: {}", notice.notice_type, notice.id, notice.title);
    Ok(())
}

fn cmd_delete_notice(dir: &Path, id: u64) -> Result<()> {
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let notice = delete_notice(&mut store, actor, id)?;
    println!("Deleted notice {}: {}", notice.id, notice.title);
    Ok(())
}

fn cmd_complaints(dir: &Path, status: Option<&str>) -> Result<()> {
    let status: Option<ComplaintStatus> = status.map(str::parse).transpose()?;
    let (_, store) = open(dir)?;
    let actor = signed_in(dir)?;
    actor.member(store.db())?;
    let complaints = list_complaints(store.db(), actor.society_id, status);

    if complaints.is_empty() {
        println!("No complaints found.");
        return Ok(());
    }

    let rows: Vec<ComplaintRow> = complaints
        .iter()
        .map(|c| ComplaintRow {
            id: c.complaint.id,
            filed: format_timestamp(c.complaint.created_at),
            status: c.complaint.status.to_string(),
            title: c.complaint.title.clone(),
            filed_by: c
                .filed_by
                .map(|u| format!("{} ({})", u.name, u.flat_number))
                .unwrap_or_default(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_file_complaint(dir: &Path, title: &str, description: &str) -> Result<()> {
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let complaint = file_complaint(&mut store, actor, title, description)?;
    println!("Filed complaint {}: {}", complaint.id, complaint.title);
    Ok(())
}

fn cmd_advance_complaint(dir: &Path, id: u64, to: Option<&str>) -> Result<()> {
    let target: Option<ComplaintStatus> = to.map(str::parse).transpose()?;
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let complaint = match target {
        Some(status) => set_complaint_status(&mut store, actor, id, status)?,
        None => advance_complaint(&mut store, actor, id)?,
    };
    println!("Complaint {} is now {}", complaint.id, complaint.status);
    Ok(())
}

fn cmd_delete_complaint(dir: &Path, id: u64) -> Result<()> {
    let (_, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let complaint = delete_complaint(&mut store, actor, id)?;
    println!("Deleted complaint {}: {}", complaint.id, complaint.title);
    Ok(())
}

fn cmd_bills(dir: &Path) -> Result<()> {
    let (config, store) = open(dir)?;
    let actor = signed_in(dir)?;
    actor.member(store.db())?;
    let bills = list_bills(store.db(), actor.society_id);

    if bills.is_empty() {
        println!("No bills created yet.");
        return Ok(());
    }

    let symbol = &config.general.currency_symbol;
    let rows: Vec<BillRow> = bills
        .iter()
        .map(|b| BillRow {
            id: b.id,
            month: b.bill_month.clone(),
            title: b.title.clone(),
            amount: format_money(b.default_amount, symbol),
            due: format_date(b.due_date),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_create_bill(
    dir: &Path,
    amount: f64,
    month: Option<String>,
    due: Option<String>,
    title: Option<String>,
    description: String,
) -> Result<()> {
    let (config, mut store) = open(dir)?;
    let actor = signed_in(dir)?;

    let bill_month = month.unwrap_or_else(|| month_of(today()));
    let due_date = match due {
        Some(s) => parse_date(&s)?,
        None => default_due_date(&config.billing, &bill_month)?,
    };
    let title = match title {
        Some(t) => t,
        None => default_title(&config.billing, &bill_month)?,
    };
    let form = BillForm {
        bill_month,
        default_amount: amount,
        due_date,
        title,
        description,
    };

    let run = create_bill(&mut store, actor, &form)?;
    let symbol = &config.general.currency_symbol;

    println!("Created bill {}: {}", run.bill.id, run.bill.title);
    println!("  Due: {}", format_date(run.bill.due_date));
    let rows: Vec<FlatBillRow> = run
        .flat_bills
        .iter()
        .map(|fb| FlatBillRow {
            flat: fb.flat_number.clone(),
            charge: format_money(fb.bill_amount, symbol),
            adjusted: format_money(fb.adjusted_amount, symbol),
            status: fb.status.to_string(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_record_payment(
    dir: &Path,
    flat_number: String,
    amount: f64,
    bill: Option<u64>,
    method: &str,
    date: Option<String>,
    reference: String,
    remarks: String,
) -> Result<()> {
    let method: PaymentMethod = method.parse()?;
    let payment_date = match date {
        Some(s) => parse_date(&s)?,
        None => today(),
    };
    let (config, mut store) = open(dir)?;
    let actor = signed_in(dir)?;
    let bill_id = resolve_bill(store.db(), actor.society_id, bill)?.id;

    let form = PaymentForm {
        flat_number,
        bill_id,
        amount,
        method,
        payment_date,
        reference,
        remarks,
    };
    let receipt = record_payment(&mut store, actor, &form)?;
    let symbol = &config.general.currency_symbol;
    let fb = &receipt.flat_bill;

    let standing = if fb.balance_due < -0.001 {
        format!("{} advance", format_money(-fb.balance_due, symbol))
    } else if fb.status == BillStatus::Paid {
        "fully paid".to_string()
    } else {
        format!("{} remaining", format_money(fb.balance_due, symbol))
    };
    println!(
        "Recorded {} payment for {} ({})",
        format_money(receipt.transaction.amount_paid, symbol),
        receipt.transaction.flat_number,
        standing
    );
    Ok(())
}

fn cmd_payments(dir: &Path, limit: Option<usize>) -> Result<()> {
    let (config, store) = open(dir)?;
    let actor = signed_in(dir)?;
    let limit = limit.unwrap_or(config.lists.payment_history_limit);
    let payments = payment_history(store.db(), actor, limit)?;

    if payments.is_empty() {
        println!("No payments recorded.");
        return Ok(());
    }

    let symbol = &config.general.currency_symbol;
    let rows: Vec<PaymentRow> = payments
        .iter()
        .map(|p| PaymentRow {
            date: format_date(p.payment.payment_date),
            flat: p.payment.flat_number.clone(),
            amount: format_money(p.payment.amount_paid, symbol),
            method: p.payment.payment_method.to_string(),
            bill: p.bill.map(|b| b.title.clone()).unwrap_or_default(),
            reference: p.payment.transaction_reference.clone(),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_my_dues(dir: &Path) -> Result<()> {
    let (config, store) = open(dir)?;
    let actor = signed_in(dir)?;
    let dues = resident_dues(store.db(), actor, config.lists.resident_history_limit)?;
    let symbol = &config.general.currency_symbol;

    println!("Flat {}", dues.flat.flat_number);
    println!("{}", "-".repeat(50));

    match (dues.latest_bill, dues.flat_bill) {
        (Some(bill), Some(fb)) => {
            println!("Bill:       {}", bill.title);
            println!("Due date:   {}", format_date(bill.due_date));
            println!("Charge:     {}", format_money(fb.bill_amount, symbol));
            println!("Amount due: {}", format_money(fb.adjusted_amount, symbol));
            println!("Paid:       {}", format_money(fb.total_paid, symbol));
            println!("Balance:    {}", format_money(fb.balance_due, symbol));
            println!("Status:     {}", fb.status);
        }
        (Some(bill), None) => println!("Bill:       {} (not billed to this flat)", bill.title),
        (None, _) => println!("No bills yet."),
    }

    println!();
    if dues.ledger_balance > 0.001 {
        println!("Advance:    {}", format_money(dues.ledger_balance, symbol));
    } else if dues.ledger_balance < -0.001 {
        println!("Total due:  {}", format_money(-dues.ledger_balance, symbol));
    } else {
        println!("All clear.");
    }

    if !dues.payments.is_empty() {
        println!();
        let rows: Vec<PaymentRow> = dues
            .payments
            .iter()
            .map(|p| PaymentRow {
                date: format_date(p.payment.payment_date),
                flat: p.payment.flat_number.clone(),
                amount: format_money(p.payment.amount_paid, symbol),
                method: p.payment.payment_method.to_string(),
                bill: p.bill.map(|b| b.title.clone()).unwrap_or_default(),
                reference: p.payment.transaction_reference.clone(),
            })
            .collect();
        print_table(rows);
    }
    Ok(())
}

fn cmd_defaulters(dir: &Path, bill: Option<u64>) -> Result<()> {
    let (config, store) = open(dir)?;
    let actor = signed_in(dir)?;
    let (bill, rows) = defaulters(store.db(), actor, bill)?;
    let symbol = &config.general.currency_symbol;

    println!("Defaulters for {}", bill.title);
    if rows.is_empty() {
        println!("  Every flat has paid.");
        return Ok(());
    }

    let rows: Vec<DefaulterRow> = rows
        .iter()
        .map(|d| DefaulterRow {
            flat: d.flat_bill.flat_number.clone(),
            due: format_money(d.flat_bill.adjusted_amount, symbol),
            paid: format_money(d.flat_bill.total_paid, symbol),
            balance: format_money(d.flat_bill.balance_due, symbol),
            status: d.flat_bill.status.to_string(),
            residents: d
                .residents
                .iter()
                .map(|u| format!("{} {}", u.name, u.phone))
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_overview(dir: &Path, bill: Option<u64>) -> Result<()> {
    let (config, store) = open(dir)?;
    let actor = signed_in(dir)?;
    let (bill, overview) = bill_overview(store.db(), actor, bill)?;
    let symbol = &config.general.currency_symbol;

    println!("{}", bill.title);
    println!("{}", "-".repeat(50));
    println!("Total flats:     {}", overview.total_flats);
    println!("Paid:            {}", overview.paid_flats);
    println!("Pending:         {}", overview.pending_flats);
    println!(
        "Collected:       {}",
        format_money(overview.total_collected, symbol)
    );
    println!(
        "Outstanding:     {}",
        format_money(overview.total_pending, symbol)
    );
    println!("Collection rate: {}%", overview.collection_rate);
    Ok(())
}
