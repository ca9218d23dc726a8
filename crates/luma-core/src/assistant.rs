//! Insight assistant
//!
//! Builds a typed context from spending records, picks the matching prompt
//! and sends it through the [`ChatGateway`]. Analysis, comparison, forecast,
//! explanation and unusual-spending requests are part of the conversation;
//! monthly reports and suggestions are one-shot.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::chat::ChatGateway;
use crate::context::{
    ContextPayload, ForecastContext, MonthlyReportContext, PeriodComparisonContext,
    SpendingCheckContext, SuggestionsContext, TransactionAnalysisContext,
    TransactionExplanationContext, UnusualSpendingContext,
};
use crate::error::{Error, Result};
use crate::insights::{self, CategoryAverages, SpendingRecord};
use crate::prompts::PromptId;

const NOT_INFORMED: &str = "não informado";

pub struct InsightAssistant {
    gateway: ChatGateway,
}

impl InsightAssistant {
    pub fn new(gateway: ChatGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &ChatGateway {
        &self.gateway
    }

    /// General insights over the records (first 10 sent in full)
    pub async fn analyze_transactions(&self, records: &[SpendingRecord]) -> Result<String> {
        let context = ContextPayload::json(&TransactionAnalysisContext::new(records))?;
        self.ask(PromptId::AnalyzeTransactions, &HashMap::new(), context)
            .await
    }

    /// Monthly report for a 1-based month
    pub async fn generate_monthly_report(
        &self,
        records: &[SpendingRecord],
        month: u32,
        year: i32,
    ) -> Result<String> {
        if !(1..=12).contains(&month) {
            return Err(Error::InvalidData(format!("Invalid month: {}", month)));
        }
        let context = ContextPayload::json(&MonthlyReportContext::new(records, month, year))?;
        self.gateway.generate_report(&context).await
    }

    /// Suggestions from recent records plus a free-form profile and goals
    pub async fn personalized_suggestions(
        &self,
        records: &[SpendingRecord],
        profile: Value,
        goals: Option<Value>,
    ) -> Result<String> {
        let context = ContextPayload::json(&SuggestionsContext::new(records, profile, goals))?;
        self.gateway.optimization_suggestions(&context).await
    }

    pub async fn compare_periods(
        &self,
        current: &[SpendingRecord],
        previous: &[SpendingRecord],
    ) -> Result<String> {
        let context = ContextPayload::json(&PeriodComparisonContext::new(current, previous))?;
        self.ask(PromptId::ComparePeriods, &HashMap::new(), context)
            .await
    }

    pub async fn explain_transaction(&self, record: &SpendingRecord) -> Result<String> {
        let amount = record
            .amount
            .map(|a| format!("{:.2}", a))
            .unwrap_or_else(|| NOT_INFORMED.to_string());
        let date = record
            .occurred_at
            .map(|d| d.format("%d/%m/%Y %H:%M").to_string())
            .unwrap_or_else(|| NOT_INFORMED.to_string());

        let vars = HashMap::from([
            ("amount", amount.as_str()),
            ("category", record.category_label()),
            ("date", date.as_str()),
            (
                "description",
                record.description.as_deref().unwrap_or(NOT_INFORMED),
            ),
            ("status", record.status.as_deref().unwrap_or(NOT_INFORMED)),
        ]);

        let context = ContextPayload::json(&TransactionExplanationContext {
            transaction: record.clone(),
        })?;
        self.ask(PromptId::ExplainTransaction, &vars, context).await
    }

    /// Next-month forecast from the full history
    pub async fn predict_future_spending(&self, historical: &[SpendingRecord]) -> Result<String> {
        let context = ContextPayload::json(&ForecastContext::new(historical))?;
        self.ask(PromptId::PredictSpending, &HashMap::new(), context)
            .await
    }

    /// Flag recent records above 1.5x their category average
    ///
    /// Falls back to a general "is my spending normal" question when nothing
    /// is flagged.
    pub async fn check_unusual_spending(
        &self,
        recent: &[SpendingRecord],
        averages: &CategoryAverages,
    ) -> Result<String> {
        let unusual = insights::detect_unusual_transactions(recent, averages);
        debug!(
            recent = recent.len(),
            flagged = unusual.len(),
            "Checked for unusual spending"
        );

        if unusual.is_empty() {
            let context = ContextPayload::json(&SpendingCheckContext {
                recent_transactions: recent.to_vec(),
                historical_average: averages.clone(),
            })?;
            return self
                .ask(PromptId::SpendingCheck, &HashMap::new(), context)
                .await;
        }

        let context = ContextPayload::json(&UnusualSpendingContext {
            unusual_transactions: unusual,
            normal_pattern: averages.clone(),
        })?;
        self.ask(PromptId::UnusualSpending, &HashMap::new(), context)
            .await
    }

    async fn ask(
        &self,
        id: PromptId,
        vars: &HashMap<&str, &str>,
        context: ContextPayload,
    ) -> Result<String> {
        let message = self.gateway.render_prompt(id, vars)?.user;
        let reply = self.gateway.send_message(&message, Some(context)).await?;
        Ok(reply.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{ChatRole, MockBackend};
    use crate::config::{AssistantConfig, BackendKind};
    use crate::prompts::PromptLibrary;
    use chrono::NaiveDate;
    use std::sync::{Arc, RwLock};

    fn assistant(mock: &MockBackend) -> InsightAssistant {
        let config = AssistantConfig {
            backend: BackendKind::Mock,
            ..Default::default()
        };
        let gateway = ChatGateway::new(mock.clone().into(), &config)
            .with_prompts(Arc::new(RwLock::new(PromptLibrary::embedded_only())));
        InsightAssistant::new(gateway)
    }

    fn sample() -> Vec<SpendingRecord> {
        let day = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        vec![
            SpendingRecord::new(50.0).with_category("Mercado").on(day),
            SpendingRecord::new(70.0).with_category("Mercado").on(day),
            SpendingRecord::new(30.0).with_category("Transporte").on(day),
        ]
    }

    fn last_prompt(mock: &MockBackend) -> String {
        mock.requests()
            .last()
            .and_then(|r| r.last_prompt().map(str::to_string))
            .unwrap()
    }

    #[tokio::test]
    async fn test_analyze_goes_through_history() {
        let mock = MockBackend::new().with_replies(["análise"]);
        let luma = assistant(&mock);

        let reply = luma.analyze_transactions(&sample()).await.unwrap();
        assert_eq!(reply, "análise");

        let prompt = last_prompt(&mock);
        assert!(prompt.starts_with("Analise minhas transações recentes"));
        assert!(prompt.contains("\"totalTransactions\": 3"));
        assert_eq!(luma.gateway().history().len(), 3);
    }

    #[tokio::test]
    async fn test_monthly_report_is_one_shot() {
        let mock = MockBackend::new();
        let luma = assistant(&mock);

        luma.generate_monthly_report(&sample(), 3, 2024).await.unwrap();

        let prompt = last_prompt(&mock);
        assert!(prompt.contains("\"month\": \"Março\""));
        assert!(prompt.contains("\"count\": 3"));
        assert_eq!(luma.gateway().history().len(), 1);
    }

    #[tokio::test]
    async fn test_monthly_report_rejects_bad_month() {
        let mock = MockBackend::new();
        let luma = assistant(&mock);
        let result = luma.generate_monthly_report(&sample(), 13, 2024).await;
        assert!(matches!(result, Err(Error::InvalidData(_))));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_explain_fills_variables() {
        let mock = MockBackend::new();
        let luma = assistant(&mock);
        let record = SpendingRecord::new(12.5).with_description("Café");

        luma.explain_transaction(&record).await.unwrap();

        let prompt = last_prompt(&mock);
        assert!(prompt.contains("- Valor: R$ 12.50"));
        assert!(prompt.contains("- Categoria: Outros"));
        assert!(prompt.contains("- Descrição: Café"));
        assert!(prompt.contains("- Data: não informado"));
    }

    #[tokio::test]
    async fn test_unusual_spending_picks_prompt() {
        let mock = MockBackend::new();
        let luma = assistant(&mock);
        let averages = CategoryAverages::from([("Mercado".to_string(), 60.0)]);

        let normal = vec![SpendingRecord::new(80.0).with_category("Mercado")];
        luma.check_unusual_spending(&normal, &averages).await.unwrap();
        assert!(last_prompt(&mock).starts_with("Meus gastos estão normais"));

        let spike = vec![SpendingRecord::new(200.0).with_category("Mercado")];
        luma.check_unusual_spending(&spike, &averages).await.unwrap();
        let prompt = last_prompt(&mock);
        assert!(prompt.starts_with("Identifiquei algumas transações"));
        assert!(prompt.contains("unusualTransactions"));
    }

    #[tokio::test]
    async fn test_suggestions_include_profile() {
        let mock = MockBackend::new();
        let luma = assistant(&mock);

        luma.personalized_suggestions(
            &sample(),
            serde_json::json!({"renda": 5000}),
            None,
        )
        .await
        .unwrap();

        let prompt = last_prompt(&mock);
        assert!(prompt.contains("\"renda\": 5000"));
        assert!(!prompt.contains("financialGoals"));
    }

    #[tokio::test]
    async fn test_failed_request_propagates() {
        let mock = MockBackend::failing("quota");
        let luma = assistant(&mock);

        let result = luma.predict_future_spending(&sample()).await;
        assert!(matches!(result, Err(Error::Gateway(_))));
        let history = luma.gateway().history();
        assert_eq!(history.last().map(|m| m.role), Some(ChatRole::Assistant));
    }
}
