//! Client commands - talk to a running Teams API and print the result

use std::fmt::Write as _;

use crate::api::health::HealthResponse;
use crate::config::LogFormat;
use crate::domain::team::Team;
use crate::domain::DomainError;
use crate::infrastructure::client::HttpTeamsClient;
use crate::infrastructure::logging::{init_logging, LoggingConfig};

use super::Command;

const SEPARATOR_WIDTH: usize = 60;

/// Execute one client command against `url`
pub async fn run(url: &str, command: Command) -> anyhow::Result<()> {
    init_logging(&LoggingConfig {
        level: "warn".to_string(),
        format: LogFormat::Pretty,
    });

    let client = HttpTeamsClient::new(url)?;

    match execute(&client, command).await {
        Ok(output) => {
            print!("{}", output);
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!(describe_error(&client, &e))),
    }
}

async fn execute(client: &HttpTeamsClient, command: Command) -> Result<String, DomainError> {
    let output = match command {
        Command::Health => format_health(&client.health().await?),
        Command::Create { name } => {
            let team = client.create_team(&name).await?;
            format!("Created team: {}\n{}", team.name(), format_team(&team))
        }
        Command::List => format_team_list(&client.list_teams().await?),
        Command::Get { id } => format_team(&client.get_team(&id).await?),
        Command::Delete { id } => format!("{}\n", client.delete_team(&id).await?.message),
        Command::Serve | Command::Operator => {
            return Err(DomainError::internal("not a client command"));
        }
    };

    Ok(output)
}

fn describe_error(client: &HttpTeamsClient, error: &DomainError) -> String {
    match error {
        DomainError::Backend { message } => format!(
            "Could not reach the Teams API at {}: {}",
            client.base_url(),
            message
        ),
        other => other.to_string(),
    }
}

fn format_health(health: &HealthResponse) -> String {
    format!(
        "API Status: {}\nTeams Count: {}\n",
        health.status, health.teams_count
    )
}

fn format_team(team: &Team) -> String {
    format!(
        "Name: {}\nID: {}\nCreated: {}\n",
        team.name(),
        team.id(),
        team.created_at().to_rfc3339()
    )
}

fn format_team_list(teams: &[Team]) -> String {
    if teams.is_empty() {
        return "No teams found\n".to_string();
    }

    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut output = format!("Found {} team(s):\n{}\n", teams.len(), separator);
    for team in teams {
        let _ = writeln!(output, "{}{}", format_team(team), separator);
    }

    output
}
