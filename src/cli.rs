// src/cli.rs
use dialoguer::{theme::ColorfulTheme, Select};
use std::sync::Arc;
use tracing::error;

use crate::airtable::LeadStore;
use crate::anthropic::GenerationService;
use crate::campaign::OutreachAgent;
use crate::clickup::TaskStore;
use crate::email_sender::Mailer;
use crate::models::{CampaignStats, PerformanceReport, Result};

#[derive(Debug, Clone)]
pub enum MenuAction {
    RunCampaign,
    CheckConnectivity,
    Exit,
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MenuAction::RunCampaign => write!(f, "🚀 Run outreach campaign"),
            MenuAction::CheckConnectivity => write!(f, "🔌 Check service connectivity"),
            MenuAction::Exit => write!(f, "👋 Exit"),
        }
    }
}

pub struct CliApp {
    agent: OutreachAgent,
    leads: Arc<dyn LeadStore>,
    generation: Arc<dyn GenerationService>,
    mailer: Arc<dyn Mailer>,
    tasks: Arc<dyn TaskStore>,
    smtp_info: String,
}

impl CliApp {
    pub fn new(
        agent: OutreachAgent,
        leads: Arc<dyn LeadStore>,
        generation: Arc<dyn GenerationService>,
        mailer: Arc<dyn Mailer>,
        tasks: Arc<dyn TaskStore>,
        smtp_info: String,
    ) -> Self {
        Self {
            agent,
            leads,
            generation,
            mailer,
            tasks,
            smtp_info,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        println!("\n🚀 Welcome to Outreach Agent!");
        println!("═══════════════════════════════════════");

        loop {
            let actions = vec![
                MenuAction::RunCampaign,
                MenuAction::CheckConnectivity,
                MenuAction::Exit,
            ];

            let selection = Select::with_theme(&ColorfulTheme::default())
                .with_prompt("\nSelect an action")
                .default(0)
                .items(&actions)
                .interact()?;

            match &actions[selection] {
                MenuAction::RunCampaign => {
                    println!(
                        "\n🎯 Campaign run {}",
                        chrono::Utc::now().format("%Y-%m-%d %H:%M UTC")
                    );
                    match self.agent.run_campaign().await {
                        Ok((stats, report)) => print_summary(&stats, &report),
                        Err(e) => {
                            error!("Campaign failed: {}", e);
                            return Err(e.into());
                        }
                    }
                }
                MenuAction::CheckConnectivity => self.check_connectivity().await,
                MenuAction::Exit => break,
            }
        }

        Ok(())
    }

    async fn check_connectivity(&self) {
        println!("\n🔌 Checking service connectivity...");
        println!("   SMTP relay: {}", self.smtp_info);

        let checks = [
            ("Lead store", self.leads.check_connectivity().await),
            ("Message generation", self.generation.check_connectivity().await),
            ("Email transport", self.mailer.check_connectivity().await),
            ("Task tracker", self.tasks.check_connectivity().await),
        ];

        for (service, ok) in checks {
            println!("   {} {}", if ok { "✅" } else { "❌" }, service);
        }
    }
}

fn print_summary(stats: &CampaignStats, report: &PerformanceReport) {
    println!("\nCampaign Summary:");
    println!("Total Leads: {}", stats.total_leads);
    println!("Validated: {}", stats.validated_leads);
    println!("Messages Generated: {}", stats.messages_generated);
    println!("Emails Sent: {}", stats.emails_sent);
    println!("Tasks Created: {}", stats.tasks_created);
    println!("Failed: {}", stats.failed_leads);

    println!("\nPerformance Metrics:");
    println!(
        "Total Processing Time: {:.2}s",
        report.total_processing.as_secs_f64()
    );
    println!(
        "Average Message Generation: {:.2}s",
        report.average_message_time.as_secs_f64()
    );
    println!(
        "Average Email Sending: {:.2}s",
        report.average_email_time.as_secs_f64()
    );
    println!(
        "Average Task Creation: {:.2}s",
        report.average_task_time.as_secs_f64()
    );
}
