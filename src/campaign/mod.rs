// src/campaign/mod.rs
mod validator;

pub use validator::validate_lead;

use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::airtable::LeadStore;
use crate::anthropic::MessageGenerator;
use crate::clickup::{TaskOptions, TaskStore};
use crate::email_sender::Mailer;
use crate::error::LeadStoreError;
use crate::models::{
    CampaignStats, ClientProfile, Lead, PerformanceMetrics, PerformanceReport, StageOutcome,
};

/// Drives one full pass over the lead list: validate, generate a message,
/// send it, file a follow-up task, and keep score.
pub struct OutreachAgent {
    leads: Arc<dyn LeadStore>,
    generator: MessageGenerator,
    mailer: Arc<dyn Mailer>,
    tasks: Arc<dyn TaskStore>,
    profile: ClientProfile,
    from_email: String,
    task_list_id: String,
    metrics: PerformanceMetrics,
}

impl OutreachAgent {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        leads: Arc<dyn LeadStore>,
        generator: MessageGenerator,
        mailer: Arc<dyn Mailer>,
        tasks: Arc<dyn TaskStore>,
        profile: ClientProfile,
        from_email: String,
        task_list_id: String,
    ) -> Self {
        Self {
            leads,
            generator,
            mailer,
            tasks,
            profile,
            from_email,
            task_list_id,
            metrics: PerformanceMetrics::default(),
        }
    }

    async fn generate_message(&mut self, lead: &Lead) -> Option<String> {
        let started = Instant::now();
        match self
            .generator
            .generate_outreach_message(lead, &self.profile)
            .await
        {
            Ok(message) => {
                let elapsed = started.elapsed();
                self.metrics.message_generation += elapsed;
                info!(
                    "Generated personalized message for {} in {:.2}s",
                    lead.display_name(),
                    elapsed.as_secs_f64()
                );
                Some(message)
            }
            Err(e) => {
                error!(
                    "Failed to generate message for {}: {}",
                    lead.display_name(),
                    e
                );
                None
            }
        }
    }

    async fn send_outreach_email(&mut self, lead: &Lead, message: &str) -> bool {
        let started = Instant::now();
        let company = lead.company.as_deref().unwrap_or_default();
        let email = lead.email.as_deref().unwrap_or_default();
        let subject = format!("Let's help {company} grow!");

        match self
            .mailer
            .send(email, &subject, message, Some(&self.from_email))
            .await
        {
            Ok(()) => {
                let elapsed = started.elapsed();
                self.metrics.email_sending += elapsed;
                info!(
                    "Successfully sent email to {} <{}> in {:.2}s",
                    lead.display_name(),
                    email,
                    elapsed.as_secs_f64()
                );
                true
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", lead.display_name(), e);
                false
            }
        }
    }

    async fn create_followup_task(&mut self, lead: &Lead, message: &str) -> bool {
        let started = Instant::now();
        let company = lead.company.as_deref().unwrap_or_default();
        let task_name = format!("Follow up with {} at {}", lead.display_name(), company);
        let options = TaskOptions {
            description: Some(message.to_string()),
            ..Default::default()
        };

        match self
            .tasks
            .create_task(&self.task_list_id, &task_name, &options)
            .await
        {
            Ok(task) => {
                let elapsed = started.elapsed();
                self.metrics.task_creation += elapsed;
                info!(
                    "Created follow-up task {} for {} in {:.2}s",
                    task.id,
                    lead.display_name(),
                    elapsed.as_secs_f64()
                );
                true
            }
            Err(e) => {
                error!(
                    "Failed to create follow-up task for {}: {}",
                    lead.display_name(),
                    e
                );
                false
            }
        }
    }

    /// Runs one lead through the stage sequence. Validation failure stops
    /// everything; generation failure stops before email/task; once a
    /// message exists, email and task are attempted independently. Nothing
    /// escapes this boundary.
    pub async fn process_lead(&mut self, lead: &Lead) -> StageOutcome {
        let mut outcome = StageOutcome::default();

        if !validate_lead(lead) {
            return outcome;
        }
        outcome.validation = true;

        let message = match self.generate_message(lead).await {
            Some(message) => message,
            None => return outcome,
        };
        outcome.message_generation = true;

        outcome.email_sent = self.send_outreach_email(lead, &message).await;
        outcome.task_created = self.create_followup_task(lead, &message).await;

        outcome
    }

    /// One full campaign pass. Only a failure of the initial batch fetch is
    /// fatal; per-lead failures are absorbed into the stats.
    pub async fn run_campaign(
        &mut self,
    ) -> Result<(CampaignStats, PerformanceReport), LeadStoreError> {
        let campaign_start = Instant::now();
        info!("Starting outreach campaign");

        let mut stats = CampaignStats::default();

        let records = match self.leads.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                error!("Campaign execution failed: {}", e);
                return Err(e);
            }
        };
        stats.total_leads = records.len();
        info!("Retrieved {} leads from the lead store", records.len());

        for record in &records {
            let outcome = self.process_lead(&record.fields).await;
            stats.record(&outcome);
        }

        self.metrics.total_processing = campaign_start.elapsed();
        let report = self.metrics.report(&stats);
        info!(
            "Campaign completed in {:.2}s. Stats: {:?}",
            report.total_processing.as_secs_f64(),
            stats
        );
        Ok((stats, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anthropic::{GenerationService, RetryPolicy};
    use crate::clickup::Task;
    use crate::error::{EmailError, GenerationError, TaskError};
    use crate::models::LeadRecord;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Default)]
    struct FakeStore {
        records: Vec<LeadRecord>,
        fail_fetch: bool,
    }

    #[async_trait]
    impl LeadStore for FakeStore {
        async fn fetch_all(&self) -> Result<Vec<LeadRecord>, LeadStoreError> {
            if self.fail_fetch {
                return Err(LeadStoreError::NotFound);
            }
            Ok(self.records.clone())
        }

        async fn insert(&self, _lead: &Lead) -> Result<LeadRecord, LeadStoreError> {
            unimplemented!("not exercised by these tests")
        }

        async fn update(
            &self,
            _record_id: &str,
            _lead: &Lead,
        ) -> Result<LeadRecord, LeadStoreError> {
            unimplemented!("not exercised by these tests")
        }

        async fn delete(
            &self,
            _record_id: &str,
        ) -> Result<crate::airtable::DeleteConfirmation, LeadStoreError> {
            unimplemented!("not exercised by these tests")
        }

        async fn check_connectivity(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct FakeGeneration {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl GenerationService for FakeGeneration {
        async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(GenerationError::Service {
                    status: 500,
                    body: "overloaded".to_string(),
                })
            } else {
                Ok("Hello from the agency".to_string())
            }
        }

        async fn check_connectivity(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct FakeMailer {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Mailer for FakeMailer {
        async fn send(
            &self,
            _to: &str,
            _subject: &str,
            _body: &str,
            _from: Option<&str>,
        ) -> Result<(), EmailError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EmailError::InvalidInput("relay refused".to_string()))
            } else {
                Ok(())
            }
        }

        async fn check_connectivity(&self) -> bool {
            true
        }
    }

    #[derive(Default)]
    struct FakeTasks {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TaskStore for FakeTasks {
        async fn create_task(
            &self,
            _list_id: &str,
            name: &str,
            _options: &TaskOptions,
        ) -> Result<Task, TaskError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(TaskError::NotFound)
            } else {
                Ok(Task {
                    id: "task-1".to_string(),
                    name: name.to_string(),
                    url: None,
                })
            }
        }

        async fn get_tasks(
            &self,
            _list_id: &str,
            _limit: usize,
        ) -> Result<Vec<Task>, TaskError> {
            Ok(Vec::new())
        }

        async fn update_task(
            &self,
            _task_id: &str,
            _updates: &serde_json::Value,
        ) -> Result<Task, TaskError> {
            unimplemented!("not exercised by these tests")
        }

        async fn delete_task(&self, _task_id: &str) -> Result<bool, TaskError> {
            Ok(true)
        }

        async fn check_connectivity(&self) -> bool {
            true
        }
    }

    struct Fixture {
        agent: OutreachAgent,
        generation: Arc<FakeGeneration>,
        mailer: Arc<FakeMailer>,
        tasks: Arc<FakeTasks>,
    }

    fn fixture(store: FakeStore, generation: FakeGeneration, mailer: FakeMailer, tasks: FakeTasks) -> Fixture {
        let generation = Arc::new(generation);
        let mailer = Arc::new(mailer);
        let tasks = Arc::new(tasks);

        let generator = MessageGenerator::new(
            generation.clone() as Arc<dyn GenerationService>,
            RetryPolicy::default(),
        );
        let agent = OutreachAgent::new(
            Arc::new(store),
            generator,
            mailer.clone() as Arc<dyn Mailer>,
            tasks.clone() as Arc<dyn TaskStore>,
            ClientProfile {
                name: "SuperGrowth Agency".to_string(),
                offer: "growth services".to_string(),
            },
            "agent@supergrowth.example".to_string(),
            "list-42".to_string(),
        );

        Fixture {
            agent,
            generation,
            mailer,
            tasks,
        }
    }

    fn record(id: &str, lead: Lead) -> LeadRecord {
        LeadRecord {
            id: id.to_string(),
            fields: lead,
            created_time: None,
        }
    }

    #[tokio::test]
    async fn happy_path_passes_every_stage() {
        let mut fx = fixture(
            FakeStore::default(),
            FakeGeneration::default(),
            FakeMailer::default(),
            FakeTasks::default(),
        );

        let outcome = fx
            .agent
            .process_lead(&Lead::new("John", "Acme", "john@acme.com"))
            .await;

        assert_eq!(
            outcome,
            StageOutcome {
                validation: true,
                message_generation: true,
                email_sent: true,
                task_created: true,
            }
        );
        assert_eq!(fx.generation.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.mailer.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fx.tasks.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalid_lead_short_circuits_without_network_calls() {
        let mut fx = fixture(
            FakeStore::default(),
            FakeGeneration::default(),
            FakeMailer::default(),
            FakeTasks::default(),
        );

        let outcome = fx
            .agent
            .process_lead(&Lead::new("John", "Acme", "invalid"))
            .await;

        assert_eq!(outcome, StageOutcome::default());
        assert_eq!(fx.generation.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.mailer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.tasks.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_stops_before_email_and_task() {
        let mut fx = fixture(
            FakeStore::default(),
            FakeGeneration {
                fail: true,
                ..Default::default()
            },
            FakeMailer::default(),
            FakeTasks::default(),
        );

        let outcome = fx
            .agent
            .process_lead(&Lead::new("John", "Acme", "john@acme.com"))
            .await;

        assert_eq!(
            outcome,
            StageOutcome {
                validation: true,
                ..Default::default()
            }
        );
        assert_eq!(fx.mailer.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fx.tasks.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn email_failure_does_not_block_task_creation() {
        let mut fx = fixture(
            FakeStore::default(),
            FakeGeneration::default(),
            FakeMailer {
                fail: true,
                ..Default::default()
            },
            FakeTasks::default(),
        );

        let outcome = fx
            .agent
            .process_lead(&Lead::new("John", "Acme", "john@acme.com"))
            .await;

        assert_eq!(
            outcome,
            StageOutcome {
                validation: true,
                message_generation: true,
                email_sent: false,
                task_created: true,
            }
        );
        assert_eq!(fx.tasks.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn task_failure_does_not_undo_the_email_stage() {
        let mut fx = fixture(
            FakeStore::default(),
            FakeGeneration::default(),
            FakeMailer::default(),
            FakeTasks {
                fail: true,
                ..Default::default()
            },
        );

        let outcome = fx
            .agent
            .process_lead(&Lead::new("John", "Acme", "john@acme.com"))
            .await;

        assert_eq!(
            outcome,
            StageOutcome {
                validation: true,
                message_generation: true,
                email_sent: true,
                task_created: false,
            }
        );
    }

    #[tokio::test]
    async fn campaign_aggregates_stats_across_a_mixed_batch() {
        let store = FakeStore {
            records: vec![
                record("rec1", Lead::new("John", "Acme", "john@acme.com")),
                record("rec2", Lead::new("Jane", "Globex", "not-an-email")),
                record("rec3", Lead::new("Ana", "Initech", "ana@initech.com")),
            ],
            fail_fetch: false,
        };
        let mut fx = fixture(
            store,
            FakeGeneration::default(),
            FakeMailer::default(),
            FakeTasks::default(),
        );

        let (stats, report) = fx.agent.run_campaign().await.unwrap();

        assert_eq!(stats.total_leads, 3);
        assert_eq!(stats.validated_leads, 2);
        assert_eq!(stats.messages_generated, 2);
        assert_eq!(stats.emails_sent, 2);
        assert_eq!(stats.tasks_created, 2);
        assert_eq!(stats.failed_leads, 1);
        assert!(report.total_processing >= report.message_generation);
    }

    #[tokio::test]
    async fn leads_are_processed_in_store_order() {
        let store = FakeStore {
            records: vec![
                record("rec1", Lead::new("John", "Acme", "john@acme.com")),
                record("rec2", Lead::new("Ana", "Initech", "ana@initech.com")),
            ],
            fail_fetch: false,
        };
        let mut fx = fixture(
            store,
            FakeGeneration::default(),
            FakeMailer::default(),
            FakeTasks::default(),
        );

        let (stats, _) = fx.agent.run_campaign().await.unwrap();
        assert_eq!(stats.total_leads, 2);
        assert_eq!(fx.generation.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn batch_fetch_failure_is_fatal() {
        let store = FakeStore {
            records: Vec::new(),
            fail_fetch: true,
        };
        let mut fx = fixture(
            store,
            FakeGeneration::default(),
            FakeMailer::default(),
            FakeTasks::default(),
        );

        let err = fx.agent.run_campaign().await.unwrap_err();
        assert!(matches!(err, LeadStoreError::NotFound));
        assert_eq!(fx.generation.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_batch_yields_an_empty_report() {
        let mut fx = fixture(
            FakeStore::default(),
            FakeGeneration::default(),
            FakeMailer::default(),
            FakeTasks::default(),
        );

        let (stats, report) = fx.agent.run_campaign().await.unwrap();
        assert_eq!(stats, CampaignStats::default());
        assert_eq!(report.average_message_time, Duration::from_secs(0));
    }
}
