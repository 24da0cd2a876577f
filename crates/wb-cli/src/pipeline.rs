//! Analyze → heatmap → persist, shared by the HTTP API and the CLI.

use std::time::Instant;

use serde_json::Value;
use wb_core::{Heatmap, NlpProcessor, ScoreSource, TaskInput, TaskType, build_heatmap};
use wb_store::{NewTask, Store};

/// One finished analysis, not yet stored.
#[derive(Debug)]
pub struct Analysis {
    pub task: TaskType,
    pub model_name: String,
    pub results: Value,
    pub heatmap: Option<Heatmap>,
    /// Seconds spent in the analysis itself.
    pub processing_time: f64,
}

/// Run `task` and build the heatmap when the output carries attention weights.
///
/// `input.model_name` must already be resolved; it is recorded as given.
pub fn analyze<S: ScoreSource + ?Sized>(
    processor: &NlpProcessor,
    task: TaskType,
    input: &TaskInput,
    source: &mut S,
) -> wb_core::Result<Analysis> {
    let start = Instant::now();
    let output = processor.run(task, input, source)?;
    let processing_time = start.elapsed().as_secs_f64();

    let heatmap = match output.attention_weights() {
        Some(weights) if task.has_attention() => Some(build_heatmap(&input.text, weights)?),
        _ => None,
    };

    Ok(Analysis {
        task,
        model_name: input
            .model_name
            .clone()
            .unwrap_or_else(|| processor.default_model(task).to_string()),
        results: output.to_json()?,
        heatmap,
        processing_time,
    })
}

/// Insert the task, then fold its time into the model metrics.
///
/// A metrics failure is logged and does not fail the insert.
pub fn persist(store: &Store, input_text: &str, analysis: &Analysis) -> wb_store::Result<i64> {
    let id = store.insert_task(&NewTask {
        task_type: analysis.task,
        input_text,
        model_name: &analysis.model_name,
        results: &analysis.results,
        attention_data: analysis.heatmap.as_ref(),
        processing_time: analysis.processing_time,
    })?;

    if let Err(e) = store.record_processing_time(
        &analysis.model_name,
        analysis.task.as_str(),
        analysis.processing_time,
    ) {
        tracing::error!("error updating model metrics: {e}");
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wb_core::SequenceSource;

    #[test]
    fn test_sentiment_builds_heatmap() {
        let p = NlpProcessor::new();
        let input = TaskInput::new("I love this great movie").with_model("bert-base-uncased");
        let a = analyze(&p, TaskType::Sentiment, &input, &mut SequenceSource::midpoint()).unwrap();
        let hm = a.heatmap.expect("sentiment carries attention");
        assert_eq!(hm.tokens.len(), 5);
        assert_eq!(a.results["predictions"][0]["label"], "POSITIVE");
        assert_eq!(a.model_name, "bert-base-uncased");
    }

    #[test]
    fn test_ner_has_no_heatmap() {
        let p = NlpProcessor::new();
        let input = TaskInput::new("Alice Smith visited Paris");
        let a = analyze(&p, TaskType::Ner, &input, &mut SequenceSource::midpoint()).unwrap();
        assert!(a.heatmap.is_none());
        assert_eq!(a.model_name, p.default_model(TaskType::Ner));
    }

    #[test]
    fn test_persist_records_task_and_metrics() {
        let store = Store::open_in_memory().unwrap();
        let p = NlpProcessor::new();
        let input = TaskInput::new("one two three").with_model("m");
        let a = analyze(&p, TaskType::Attention, &input, &mut SequenceSource::midpoint()).unwrap();

        let id = persist(&store, &input.text, &a).unwrap();
        let stored = store.get_task(id).unwrap().unwrap();
        assert_eq!(stored.task_type, TaskType::Attention);
        assert!(stored.heatmap().unwrap().is_some());

        persist(&store, &input.text, &a).unwrap();
        let metrics = store.list_metrics().unwrap();
        assert_eq!(metrics.len(), 1);
        assert_eq!(metrics[0].model_name, "m");
        assert_eq!(metrics[0].task_type, "attention");
        assert_eq!(metrics[0].total_requests, 2);
    }
}
