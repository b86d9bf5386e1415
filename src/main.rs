use std::error::Error;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use group_chat_client::config;
use group_chat_client::ui::{
    AuthController, ChatDisplay, ClientApp, LoadState, Notice, Route, Submission,
};

#[derive(Parser)]
#[command(
    name = "group_chat_client",
    version,
    about = "Terminal client for the group chat service"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in
    Register { username: String, password: String },
    /// Sign in
    Login { username: String, password: String },
    /// Sign out and forget the local session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Print the channel history
    Messages,
    /// Post a message to the channel
    Send { text: String },
    /// Show or edit the profile
    Profile {
        #[command(subcommand)]
        action: Option<ProfileAction>,
    },
    /// Write the effective configuration to the config file
    InitConfig,
}

#[derive(Subcommand)]
enum ProfileAction {
    Show,
    SetUsername { username: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let app_config = config::load_config(&cli.config);

    // Only init-config works without opening the local database
    let open = || ClientApp::open(&app_config);
    match cli.command {
        Command::InitConfig => {
            config::save_config(&cli.config, &app_config)?;
            println!("Wrote {}", cli.config);
            Ok(())
        }
        Command::Register { username, password } => {
            authenticate(open()?.register_view(), username, password).await
        }
        Command::Login { username, password } => {
            authenticate(open()?.login_view(), username, password).await
        }
        Command::Logout => {
            open()?.chat_view().logout().await;
            println!("Signed out.");
            Ok(())
        }
        Command::Whoami => {
            let session = open()?.session().session();
            match (session.token, session.member) {
                (Some(_), Some(member)) => println!("{}", member.username),
                (Some(_), None) => println!("Signed in (profile not loaded)"),
                _ => println!("Not signed in."),
            }
            Ok(())
        }
        Command::Messages => show_messages(&open()?).await,
        Command::Send { text } => send_message(&open()?, text).await,
        Command::Profile { action } => {
            let app = open()?;
            match action.unwrap_or(ProfileAction::Show) {
                ProfileAction::Show => show_profile(&app).await,
                ProfileAction::SetUsername { username } => set_username(&app, username).await,
            }
        }
    }
}

async fn authenticate(
    view: AuthController,
    username: String,
    password: String,
) -> Result<(), Box<dyn Error>> {
    if let Some(route) = view.mount() {
        log::debug!("Auth view redirected to {}", route.path());
        println!("Already signed in.");
        return Ok(());
    }

    view.set_username(username);
    view.set_password(password);
    match view.submit().await {
        Submission::Sent => {
            println!("Signed in as {}.", view.form().username);
            Ok(())
        }
        _ => Err(view
            .form()
            .state
            .error()
            .unwrap_or(group_chat_client::common::error_text::UNEXPECTED_ERROR)
            .into()),
    }
}

async fn show_messages(app: &ClientApp) -> Result<(), Box<dyn Error>> {
    let chat = app.chat_view();
    if chat.mount().await != Route::Chat {
        return Err("Not signed in. Run `login` first.".into());
    }
    if let Some(username) = chat.current_username() {
        println!("You: {username}");
    }
    print_display(chat.display())
}

async fn send_message(app: &ClientApp, text: String) -> Result<(), Box<dyn Error>> {
    let chat = app.chat_view();
    if chat.mount().await != Route::Chat {
        return Err("Not signed in. Run `login` first.".into());
    }

    chat.set_draft(text);
    if !chat.can_send() {
        return Err("Message is empty.".into());
    }
    match chat.send().await {
        Submission::Sent => print_display(chat.display()),
        _ => Err(chat
            .state()
            .send_error
            .unwrap_or_else(|| "Message was not sent.".to_string())
            .into()),
    }
}

fn print_display(display: ChatDisplay) -> Result<(), Box<dyn Error>> {
    match display {
        ChatDisplay::Loading => println!("Loading messages..."),
        ChatDisplay::Error(message) => return Err(message.into()),
        ChatDisplay::Empty => println!("No messages yet. Be the first to write something."),
        ChatDisplay::Messages(messages) => {
            for message in messages {
                let when = message
                    .created_at
                    .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!("[{when}] {}: {}", message.author_name(), message.text);
            }
        }
    }
    Ok(())
}

async fn show_profile(app: &ClientApp) -> Result<(), Box<dyn Error>> {
    let profile = app.profile_view();
    if profile.mount().await != Route::Profile {
        return Err("Not signed in. Run `login` first.".into());
    }
    let state = profile.state();
    if let LoadState::Failed(message) = state.load {
        return Err(message.into());
    }
    println!("Username: {}", state.username);
    Ok(())
}

async fn set_username(app: &ClientApp, username: String) -> Result<(), Box<dyn Error>> {
    let profile = app.profile_view();
    if profile.mount().await != Route::Profile {
        return Err("Not signed in. Run `login` first.".into());
    }
    profile.set_username(username);
    profile.submit().await;
    match profile.state().notice {
        Some(Notice::Success(message)) => {
            println!("{message}");
            Ok(())
        }
        Some(Notice::Error(message)) => Err(message.into()),
        None => Ok(()),
    }
}
