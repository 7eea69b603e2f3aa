//! RouteSaver CLI
//!
//! # Usage
//!
//! ```bash
//! # Create an account and start saving routes
//! routecli register --name Ana --email a@x.com --password secret1
//! routecli create "Casa-Trabalho" -15.78,-47.93 -15.80,-47.95
//! routecli list
//!
//! # Road-following view of a saved route (distance + Google Maps link)
//! routecli show R_K7NP3X
//!
//! # Interactive editor (map clicks become `click <lat> <lng>` commands)
//! routecli editor
//! ```
//!
//! The API base URL comes from ROUTESAVER_API (default http://localhost:3000);
//! the session file location can be overridden with ROUTESAVER_SESSION.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use routecli::api::ApiClient;
use routecli::editor::{Editor, EditorMode, SelectOutcome};
use routecli::external::{
    format_distance, google_maps_url, Geocoder, NominatimGeocoder, OsrmRouter, RoadRouter,
};
use routecli::models::Coordinate;
use routecli::session::SessionStore;

#[derive(Parser)]
#[command(name = "routecli")]
#[command(author, version, about = "RouteSaver command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and start a session
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Log in with an existing account
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Discard the local session
    Logout,
    /// Show the logged-in user
    Me,
    /// List saved routes, newest first
    List,
    /// Show one route with its road distance and a Google Maps link
    Show { id: String },
    /// Save a new route from lat,lng pairs
    Create {
        name: String,
        /// Points as lat,lng (at least 2); negative values are fine
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<String>,
    },
    /// Replace a route's name and points
    Update {
        id: String,
        name: String,
        #[arg(required = true, allow_hyphen_values = true)]
        points: Vec<String>,
    },
    /// Delete a route (asks for confirmation unless --yes)
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Search for a place by free text
    Search { query: String },
    /// Interactive route editor
    Editor,
}

fn parse_point(raw: &str) -> Result<Coordinate> {
    let (lat, lng) = raw
        .split_once(',')
        .with_context(|| format!("ponto inválido '{}': use lat,lng", raw))?;
    Ok(Coordinate {
        lat: lat.trim().parse().with_context(|| format!("latitude inválida '{}'", lat))?,
        lng: lng.trim().parse().with_context(|| format!("longitude inválida '{}'", lng))?,
    })
}

fn parse_points(raw: &[String]) -> Result<Vec<Coordinate>> {
    raw.iter().map(|p| parse_point(p)).collect()
}

fn build_client() -> ApiClient {
    let base =
        std::env::var("ROUTESAVER_API").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let session_path = std::env::var("ROUTESAVER_SESSION")
        .map(PathBuf::from)
        .unwrap_or_else(|_| SessionStore::default_path());
    ApiClient::new(base, SessionStore::new(session_path))
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} (s/N) ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim"))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Erro: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = build_client();

    match cli.command {
        Commands::Register {
            name,
            email,
            password,
        } => {
            let user = client.register(&name, &email, &password).await?;
            println!("Conta criada. Olá, {}!", user.name);
        }
        Commands::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("Olá, {}!", user.name);
        }
        Commands::Logout => {
            client.logout()?;
            println!("Sessão encerrada.");
        }
        Commands::Me => {
            let user = client.me().await?;
            println!("{} <{}> ({})", user.name, user.email, user.id);
        }
        Commands::List => {
            let routes = client.get_routes().await?;
            if routes.is_empty() {
                println!("Nenhuma rota salva.");
            }
            for route in routes {
                println!(
                    "{}  {}  ({} pontos)",
                    route.id,
                    route.name,
                    route.coordinates.len()
                );
            }
        }
        Commands::Show { id } => {
            let route = client.get_route(&id).await?;
            println!("{}  {}", route.id, route.name);
            for c in &route.coordinates {
                println!("  {}, {}", c.lat, c.lng);
            }

            let router = OsrmRouter::new();
            match router.compute_road_path(&route.coordinates).await {
                Ok(road) => println!(
                    "Distância pela estrada: {}",
                    format_distance(road.distance_meters)
                ),
                Err(e) => println!("Distância indisponível: {e}"),
            }
            println!("Google Maps: {}", google_maps_url(&route.coordinates));
        }
        Commands::Create { name, points } => {
            let coordinates = parse_points(&points)?;
            let route = client.create_route(&name, &coordinates).await?;
            println!("Rota salva: {}  {}", route.id, route.name);
        }
        Commands::Update { id, name, points } => {
            let coordinates = parse_points(&points)?;
            let route = client.update_route(&id, &name, &coordinates).await?;
            println!("Rota atualizada: {}  {}", route.id, route.name);
        }
        Commands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Excluir a rota {}?", id))? {
                println!("Cancelado.");
                return Ok(());
            }
            let message = client.delete_route(&id).await?;
            println!("{message}");
        }
        Commands::Search { query } => {
            let geocoder = NominatimGeocoder::new();
            let places = geocoder.search_places(&query).await?;
            if places.is_empty() {
                println!("Nenhum resultado encontrado");
            }
            for place in places {
                println!("{}, {}  {}", place.lat, place.lng, place.name);
            }
        }
        Commands::Editor => {
            run_editor(client).await?;
        }
    }

    Ok(())
}

/// Interactive editor loop. Map clicks become `click <lat> <lng>` commands;
/// everything else mirrors the dashboard's buttons.
async fn run_editor(client: ApiClient) -> Result<()> {
    if !client.session().is_authenticated() {
        bail!("Faça login antes de abrir o editor.");
    }

    let router = OsrmRouter::new();
    let geocoder = NominatimGeocoder::new();

    let mut editor = Editor::new();
    editor.load_routes(&client).await?;
    println!("{} rota(s) carregada(s). Digite 'help' para os comandos.", editor.routes().len());

    let stdin = io::stdin();
    loop {
        print!("{}> ", mode_label(editor.mode()));
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        let (command, rest) = match trimmed.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (trimmed, ""),
        };

        match command {
            "" => {}
            "help" => print_editor_help(),
            "quit" | "exit" => break,
            "list" => {
                for route in editor.visible_routes() {
                    let distance = editor
                        .distance_for(&route.id)
                        .map(|d| format!("  [{}]", format_distance(d)))
                        .unwrap_or_default();
                    println!(
                        "{}  {}  ({} pontos){}",
                        route.id,
                        route.name,
                        route.coordinates.len(),
                        distance
                    );
                }
            }
            "filter" => {
                editor.set_filter(rest);
            }
            "new" => {
                if editor.start_creation() {
                    println!("Clique no mapa para adicionar pontos.");
                } else {
                    println!("Já existe uma rota em criação.");
                }
            }
            "click" => {
                let mut values = rest.split_whitespace();
                let lat = values.next().and_then(|v| v.parse::<f64>().ok());
                let lng = values.next().and_then(|v| v.parse::<f64>().ok());
                match (lat, lng) {
                    (Some(lat), Some(lng)) => {
                        editor.map_click(lat, lng);
                        if matches!(editor.mode(), EditorMode::Creating { .. }) {
                            println!("{} ponto(s)", editor.point_count());
                        }
                    }
                    _ => println!("Uso: click <lat> <lng>"),
                }
            }
            "undo" => {
                if editor.undo_point() {
                    println!("{} ponto(s)", editor.point_count());
                }
            }
            "name" => {
                editor.set_name(rest);
            }
            "save" => match editor.save(&client).await {
                Ok(()) => println!("Rota salva."),
                Err(e) => println!("Erro ao salvar rota: {e}"),
            },
            "cancel" => {
                editor.cancel_creation();
            }
            "select" => {
                match editor.select_route(rest) {
                    SelectOutcome::Selected(request) => {
                        match router.compute_road_path(&request.waypoints).await {
                            Ok(road) => {
                                // A stale response is silently dropped here
                                if editor.apply_road_path(request.generation, &road) {
                                    println!(
                                        "Distância pela estrada: {}",
                                        format_distance(road.distance_meters)
                                    );
                                }
                            }
                            Err(e) => println!("Distância indisponível: {e}"),
                        }
                    }
                    SelectOutcome::Deselected => println!("Seleção removida."),
                    SelectOutcome::Ignored => println!("Rota desconhecida."),
                }
            }
            "delete" => {
                if editor.request_delete(rest) {
                    println!("Confirma a exclusão de {}? Digite 'confirm' ou 'abort'.", rest);
                } else {
                    println!("Rota desconhecida.");
                }
            }
            "confirm" => match editor.confirm_delete(&client).await {
                Ok(Some(id)) => println!("Rota {} excluída.", id),
                Ok(None) => println!("Nada a confirmar."),
                Err(e) => println!("Erro ao excluir: {e}"),
            },
            "abort" => {
                editor.cancel_delete();
            }
            "search" => {
                match geocoder.search_places(rest).await {
                    Ok(places) if places.is_empty() => println!("Nenhum resultado encontrado"),
                    Ok(places) => {
                        for place in places {
                            println!("{}, {}  {}", place.lat, place.lng, place.name);
                        }
                    }
                    Err(e) => println!("Erro na busca: {e}"),
                }
            }
            other => println!("Comando desconhecido: {other} (digite 'help')"),
        }
    }

    Ok(())
}

fn mode_label(mode: &EditorMode) -> &'static str {
    match mode {
        EditorMode::Viewing => "viewing",
        EditorMode::Creating { .. } => "creating",
        EditorMode::Selected { .. } => "selected",
    }
}

fn print_editor_help() {
    println!("Comandos:");
    println!("  list                 lista as rotas (com distância quando calculada)");
    println!("  filter <texto>       filtra a lista pelo nome");
    println!("  new                  inicia a criação de uma rota");
    println!("  click <lat> <lng>    adiciona um ponto (apenas durante a criação)");
    println!("  undo                 remove o último ponto");
    println!("  name <texto>         define o nome da rota em criação");
    println!("  save                 salva a rota em criação");
    println!("  cancel               descarta a rota em criação");
    println!("  select <id>          seleciona/desseleciona uma rota salva");
    println!("  delete <id>          marca uma rota para exclusão");
    println!("  confirm / abort      confirma ou cancela a exclusão");
    println!("  search <texto>       busca um lugar (geocodificação)");
    println!("  quit                 sai do editor");
}
