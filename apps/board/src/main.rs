mod config;

use std::{io::Write, path::PathBuf, sync::Arc};

use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand};
use client_core::{
    ClientError, FilterKey, FilterState, FormState, HttpListingApi, HttpRecommendationsApi,
    ListController, ListSnapshot, LoadState, RecommendationsController,
};
use shared::domain::InternshipId;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "board", about = "Browse and manage internship listings")]
struct Args {
    #[arg(long, default_value = "board.toml")]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show one page of listings.
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        education: Option<String>,
        /// Any filter by name, e.g. `--filter location_type=Remote`.
        #[arg(long = "filter", value_parser = parse_assignment)]
        filter: Vec<(String, String)>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Print the rendered card markup instead of a summary.
        #[arg(long)]
        html: bool,
    },
    /// Show the values offered for each facet.
    Facets,
    Show {
        id: i64,
    },
    Edit {
        id: i64,
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    Delete {
        id: i64,
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    Create {
        #[arg(long = "set", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },
    /// Show personalised recommendations for the session user.
    Recommendations {
        /// Regenerate instead of reading the stored set.
        #[arg(long)]
        refresh: bool,
        #[arg(long)]
        html: bool,
    },
}

fn parse_filter_key(name: &str) -> Result<FilterKey> {
    FilterKey::parse(name).ok_or_else(|| {
        let accepted: Vec<&str> = FilterKey::ALL.iter().map(|key| key.query_param()).collect();
        anyhow!("unknown filter '{name}', expected one of {}", accepted.join(", "))
    })
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got '{raw}'"))?;
    Ok((name.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let settings = config::load_settings(&args.config)?;
    let api = HttpListingApi::new(
        &settings.api_base_url,
        &settings.collection_path,
        settings.session_cookie.as_deref(),
    )?;
    info!("board: using collection {}", api.collection_url());
    let api = Arc::new(api);

    match args.command {
        Command::List {
            search,
            industry,
            location,
            education,
            filter,
            page,
            html,
        } => {
            let mut filters = FilterState::default();
            for (key, value) in [
                (FilterKey::Search, search),
                (FilterKey::Industry, industry),
                (FilterKey::Location, location),
                (FilterKey::Education, education),
            ] {
                if let Some(value) = value {
                    filters.set(key, &value);
                }
            }
            for (name, value) in &filter {
                filters.set(parse_filter_key(name)?, value);
            }

            let list = ListController::with_filters(api, settings.list_settings(), filters);
            list.mount().await;
            if page > 1 && list.go_to_page(i64::from(page) - 1).await.is_none() {
                warn!("board: page {page} is out of range, showing page 1");
            }
            print_listing(&list.snapshot().await, html)
        }
        Command::Facets => {
            let list = ListController::new(api, settings.list_settings());
            if !list.load_filter_options().await {
                return Err(notice_error(&list).await);
            }
            let facets = list.snapshot().await.facets;
            println!("Industries:       {}", facets.industries.join(", "));
            println!("Location types:   {}", facets.location_types.join(", "));
            println!("Education levels: {}", facets.education_levels.join(", "));
            Ok(())
        }
        Command::Show { id } => {
            let list = ListController::new(api, settings.list_settings());
            let opened = list.request_edit(InternshipId(id)).await;
            finish(&list, opened).await?;
            if let Some(session) = list.snapshot().await.edit {
                for (name, value) in session.form.iter() {
                    println!("{name:<22}{value}");
                }
            }
            list.close_edit().await;
            Ok(())
        }
        Command::Edit { id, set } => {
            let list = ListController::new(api, settings.list_settings());
            let opened = list.request_edit(InternshipId(id)).await;
            finish(&list, opened).await?;
            for (name, value) in &set {
                if !list.set_edit_field(name, value).await {
                    bail!("unknown field '{name}'");
                }
            }
            let submitted = list.submit_edit().await;
            finish(&list, submitted).await
        }
        Command::Delete { id, yes } => {
            let list = ListController::new(api, settings.list_settings());
            let id = InternshipId(id);
            list.request_delete(id).await;
            if !yes && !confirm(&format!("Delete internship {id}?")).await? {
                list.cancel_delete().await;
                println!("Cancelled");
                return Ok(());
            }
            let deleted = list.confirm_delete().await;
            finish(&list, deleted).await
        }
        Command::Create { set } => {
            let list = ListController::new(api, settings.list_settings());
            let mut form = FormState::internship();
            for (name, value) in &set {
                if !form.set(name, value.as_str()) {
                    bail!("unknown field '{name}'");
                }
            }
            match list.create(&form).await {
                Ok(created) => {
                    if let Some(item) = created {
                        info!("board: created internship {}", item.internship_id);
                    }
                    finish(&list, Ok(())).await
                }
                Err(err) => finish(&list, Err(err)).await,
            }
        }
        Command::Recommendations { refresh, html } => {
            show_recommendations(&settings, refresh, html).await
        }
    }
}

async fn show_recommendations(settings: &config::Settings, refresh: bool, html: bool) -> Result<()> {
    let api = HttpRecommendationsApi::new(
        &settings.api_base_url,
        &settings.api_path,
        settings.session_cookie.as_deref(),
    )?;
    let recommendations = RecommendationsController::new(Arc::new(api), settings.list_settings());
    if refresh {
        recommendations.refresh().await;
    } else {
        recommendations.load().await;
    }

    let snapshot = recommendations.snapshot().await;
    if let LoadState::Error(message) = &snapshot.load {
        bail!("{message}");
    }
    if let Some(notice) = snapshot.notice.filter(|n| !n.is_error()) {
        println!("{}", notice.message);
    }
    match &snapshot.rendered {
        Some(rendered) if html => println!("{}", rendered.html()),
        _ if snapshot.items.is_empty() => println!("No recommendations yet"),
        _ => {
            for item in &snapshot.items {
                println!(
                    "#{:<5} {} | {}",
                    item.internship_id,
                    item.internship_title.as_deref().unwrap_or_default(),
                    item.company_name.as_deref().unwrap_or("-"),
                );
            }
        }
    }
    Ok(())
}

fn print_listing(snapshot: &ListSnapshot, html: bool) -> Result<()> {
    if let LoadState::Error(message) = &snapshot.load {
        bail!("{message}");
    }
    let Some(rendered) = &snapshot.rendered else {
        bail!("no results loaded");
    };

    if html {
        println!("{}", rendered.html());
    } else if snapshot.items.is_empty() {
        println!("No internships found");
    } else {
        for item in &snapshot.items {
            println!(
                "#{:<5} {} | {} | {} | {} | {}",
                item.internship_id,
                item.internship_title.as_deref().unwrap_or_default(),
                item.company_name.as_deref().unwrap_or("-"),
                item.industry_domain.as_deref().unwrap_or_default(),
                item.location_type.as_deref().unwrap_or_default(),
                item.education_level.as_deref().unwrap_or_default(),
            );
        }
    }

    if rendered.pagination.visible {
        println!("{} ({} total)", rendered.pagination.label, snapshot.page.total);
    }
    Ok(())
}

/// Prints the success notice, or turns the error notice into the command's
/// error.
async fn finish(list: &ListController, result: Result<(), ClientError>) -> Result<()> {
    let notice = list.snapshot().await.notice;
    match result {
        Ok(()) => {
            if let Some(notice) = notice.filter(|n| !n.is_error()) {
                println!("{}", notice.message);
            }
            Ok(())
        }
        Err(err) => {
            let message = notice
                .map(|n| n.message)
                .unwrap_or_else(|| err.to_string());
            Err(anyhow::Error::new(err).context(message))
        }
    }
}

async fn notice_error(list: &ListController) -> anyhow::Error {
    match list.snapshot().await.notice {
        Some(notice) => anyhow!(notice.message),
        None => anyhow!("request failed"),
    }
}

async fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
