//! Testes de integração para o aprendizado do Noema.

use serde_json::{json, Map, Value};

use noema::learning::{
    LearningContext, LearningData, LearningEngine, LearningType, Outcome, UserFeedback,
    GENERAL_DOMAIN,
};
use noema::types::config::LearningConfig;
use noema::NoemaError;

fn context(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect()
}

// Feedback e adaptação
mod adaptation_tests {
    use super::*;

    #[test]
    fn test_feedback_nudges_strategy() {
        let mut engine = LearningEngine::default();
        let ctx = LearningContext::for_user("ana").with_task("completion");

        engine.learn_from_feedback(UserFeedback::new(5, true), ctx.clone());
        engine.learn_from_feedback(UserFeedback::new(4, true), ctx.clone());
        let strategy = engine.get_adaptation_strategy("ana", "completion").unwrap();
        assert!((strategy.effectiveness - 0.7).abs() < 1e-9);

        engine.learn_from_feedback(UserFeedback::new(1, false), ctx);
        let strategy = engine.get_adaptation_strategy("ana", "completion").unwrap();
        assert!((strategy.effectiveness - 0.6).abs() < 1e-9);

        assert_eq!(engine.history().len(), 3);
    }

    #[test]
    fn test_anonymous_feedback() {
        let mut engine = LearningEngine::default();
        engine.learn_from_feedback(UserFeedback::new(3, true), LearningContext::default());
        assert!(engine
            .get_adaptation_strategy("anonymous", GENERAL_DOMAIN)
            .is_some());
    }

    #[test]
    fn test_recommendations_need_history() {
        let mut engine = LearningEngine::default();
        for _ in 0..9 {
            engine.learn_from_feedback(
                UserFeedback::new(1, false),
                LearningContext::for_user("bia").with_task("review"),
            );
        }
        assert!(engine.adapt_to_user("bia", "review", None).parameters.is_empty());

        engine.learn_from_feedback(
            UserFeedback::new(1, false),
            LearningContext::for_user("bia").with_task("review"),
        );
        let strategy = engine.adapt_to_user("bia", "review", None);
        assert_eq!(strategy.parameters["explanation_depth"], "detailed");
        assert_eq!(strategy.parameters["focus_task"], "review");
        assert!(strategy.parameters.get("suggestion_style").is_none());
    }

    #[test]
    fn test_recommendations_from_positive_history() {
        let mut engine = LearningEngine::default();
        for _ in 0..12 {
            engine.learn_from_feedback(
                UserFeedback::new(5, true),
                LearningContext::for_user("caio")
                    .with_task("testing")
                    .with_experience("senior"),
            );
        }
        engine.learn_user_behavior("caio", "run-tests", Map::new());

        let strategy = engine.adapt_to_user("caio", "editing", Some(&json!({"theme": "dark"})));
        assert_eq!(strategy.parameters["suggestion_style"], "proactive");
        assert_eq!(strategy.parameters["experience_level"], "senior");
        assert_eq!(strategy.parameters["preferred_action"], "run-tests");
        assert_eq!(strategy.parameters["theme"], "dark");
        assert!(strategy.parameters.get("explanation_depth").is_none());
        assert!((0.0..=1.0).contains(&strategy.effectiveness));
    }

    #[test]
    fn test_custom_step() {
        let config = LearningConfig {
            effectiveness_step: 0.25,
            ..LearningConfig::default()
        };
        let mut engine = LearningEngine::new(config);
        engine.learn_from_feedback(UserFeedback::new(5, true), LearningContext::for_user("u"));

        let strategy = engine.get_adaptation_strategy("u", GENERAL_DOMAIN).unwrap();
        assert!((strategy.effectiveness - 0.75).abs() < 1e-9);
    }
}

// Comportamento e predição
mod behavior_tests {
    use super::*;

    #[test]
    fn test_frequency_and_confidence_grow() {
        let mut engine = LearningEngine::default();
        let mut last_confidence = 0.0;

        for expected in 1..=5u64 {
            let pattern = engine.learn_user_behavior("ana", "save", context(&[("file", "a.rs")]));
            assert_eq!(pattern.frequency, expected);
            assert!(pattern.confidence >= last_confidence);
            assert!(pattern.confidence <= 1.0);
            last_confidence = pattern.confidence;
        }
    }

    #[test]
    fn test_patterns_ordered_by_frequency() {
        let mut engine = LearningEngine::default();
        engine.learn_user_behavior("ana", "open", Map::new());
        engine.learn_user_behavior("ana", "save", Map::new());
        engine.learn_user_behavior("ana", "save", Map::new());
        engine.learn_user_behavior("bruno", "close", Map::new());

        let patterns = engine.get_user_behavior_patterns("ana");
        let actions: Vec<&str> = patterns.iter().map(|p| p.pattern.as_str()).collect();
        assert_eq!(actions, vec!["save", "open"]);
        assert!(engine.get_user_behavior_patterns("nobody").is_empty());
    }

    #[test]
    fn test_predict_by_context_similarity() {
        let mut engine = LearningEngine::default();
        engine.learn_user_behavior("ana", "format", context(&[("lang", "rust"), ("mode", "edit")]));
        engine.learn_user_behavior("ana", "deploy", context(&[("lang", "yaml")]));

        let predictions =
            engine.predict_user_action("ana", &context(&[("lang", "rust"), ("mode", "edit")]));
        assert_eq!(predictions.len(), 1);
        assert_eq!(predictions[0].action, "format");
        assert!((0.0..=1.0).contains(&predictions[0].confidence));

        assert!(engine
            .predict_user_action("ana", &context(&[("lang", "go")]))
            .is_empty());
    }

    #[test]
    fn test_behavior_via_learn() {
        let mut engine = LearningEngine::default();
        let data = LearningData::new("behavioral", json!({"action": "refactor"}))
            .with_context(LearningContext::for_user("caio"));
        let receipt = engine.learn(data);

        assert_eq!(receipt.learning_type, LearningType::Behavioral);
        assert_eq!(engine.get_user_behavior_patterns("caio")[0].pattern, "refactor");
    }

    #[test]
    fn test_last_seen_ignores_record_timestamp() {
        use chrono::{TimeZone, Utc};

        let mut engine = LearningEngine::default();
        let first = engine.learn_user_behavior("caio", "refactor", Map::new());

        let old = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let mut data = LearningData::new("behavioral", json!({"action": "refactor"}))
            .with_context(LearningContext::for_user("caio"));
        data.timestamp = Some(old);
        engine.learn(data);

        let pattern = &engine.get_user_behavior_patterns("caio")[0];
        assert_eq!(pattern.frequency, 2);
        assert!(pattern.last_seen >= first.last_seen);
        assert!(pattern.last_seen > old);
    }
}

// Outros processadores
mod processor_tests {
    use super::*;

    #[test]
    fn test_reinforcement_moves_value_toward_reward() {
        let mut engine = LearningEngine::default();
        let ctx = LearningContext::for_user("ana").with_task("completion");

        for _ in 0..3 {
            let feedback = UserFeedback::new(5, true)
                .with_action("accept-snippet")
                .with_outcome(Outcome::Accepted);
            engine.learn(
                LearningData::new("reinforcement", json!({}))
                    .with_feedback(feedback)
                    .with_context(ctx.clone()),
            );
        }

        let value = engine.action_value("completion", "accept-snippet").unwrap();
        // 1 - 0.9³
        assert!((value - 0.271).abs() < 1e-9);
    }

    #[test]
    fn test_unsupervised_features() {
        let mut engine = LearningEngine::default();
        engine.learn(LearningData::new("unsupervised", json!("Parse the parse tree")));
        engine.learn(LearningData::new("unsupervised", json!({"lang": "rust"})));

        assert_eq!(engine.feature_frequency("token:parse"), 2);
        assert_eq!(engine.feature_frequency("key:lang"), 1);
        assert_eq!(engine.feature_frequency("token:missing"), 0);
    }

    #[test]
    fn test_supervised_expected_output() {
        let mut engine = LearningEngine::default();
        let ctx = LearningContext::default().with_task("classify");
        engine.learn(
            LearningData::new("supervised", json!("bug"))
                .with_expected(json!("bug"))
                .with_context(ctx.clone()),
        );
        engine.learn(
            LearningData::new("supervised", json!("bug"))
                .with_expected(json!("feature"))
                .with_context(ctx),
        );

        let stats = engine.get_learning_stats();
        let performance = stats.task_performance["classify"];
        assert_eq!(performance.total, 2);
        assert_eq!(performance.positive, 1);
        assert!((performance.rate() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_custom_type_is_recorded_only() {
        let mut engine = LearningEngine::default();
        let receipt = engine.learn(LearningData::new("transfer", json!({"x": 1})));

        assert_eq!(receipt.learning_type, LearningType::Custom("transfer".to_string()));
        assert!(receipt.effects.is_empty());
        assert_eq!(engine.history().len(), 1);
    }
}

// Modelos
mod model_tests {
    use super::*;

    #[test]
    fn test_model_lifecycle() {
        let mut engine = LearningEngine::default();
        let model = engine.create_learning_model("classifier", Map::new());
        assert_eq!(model.version, 1);
        assert!(model.accuracy.is_none());

        let data = vec![
            LearningData::new("supervised", json!("a")).with_feedback(UserFeedback::new(5, true)),
            LearningData::new("supervised", json!("b")).with_feedback(UserFeedback::new(4, true)),
            LearningData::new("supervised", json!("c")).with_feedback(UserFeedback::new(1, false)),
            LearningData::new("supervised", json!("d")).with_feedback(UserFeedback::new(5, true)),
        ];
        let updated = engine.update_learning_model(&model.id, data).unwrap();

        assert_eq!(updated.version, 2);
        assert_eq!(updated.training_data.len(), 4);
        assert!((updated.accuracy.unwrap() - 0.75).abs() < 1e-9);
        assert_eq!(updated.parameters["accuracy_basis"], "feedback");
    }

    #[test]
    fn test_retrain_without_feedback() {
        let mut engine = LearningEngine::default();
        let model = engine.create_learning_model("ranker", Map::new());

        let updated = engine
            .update_learning_model(&model.id, vec![LearningData::new("unsupervised", json!("x"))])
            .unwrap();
        let accuracy = updated.accuracy.unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
        assert_eq!(updated.parameters["accuracy_basis"], "default");

        let again = engine.update_learning_model(&model.id, Vec::new()).unwrap();
        assert_eq!(again.version, 3);
        assert_eq!(again.training_data.len(), 1);
    }

    #[test]
    fn test_unknown_model() {
        let mut engine = LearningEngine::default();
        let result = engine.update_learning_model("model-404", Vec::new());

        match result {
            Err(NoemaError::ModelNotFound(id)) => assert_eq!(id, "model-404"),
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
        assert!(engine.get_learning_model("model-404").is_none());
    }

    #[test]
    fn test_models_listed_in_creation_order() {
        let mut engine = LearningEngine::default();
        let first = engine.create_learning_model("a", Map::new());
        let second = engine.create_learning_model("b", Map::new());
        assert_ne!(first.id, second.id);

        let ids: Vec<&str> = engine
            .list_learning_models()
            .iter()
            .map(|m| m.id.as_str())
            .collect();
        assert_eq!(ids, vec![first.id.as_str(), second.id.as_str()]);
    }
}

// Personalização e estatísticas
mod personalization_tests {
    use super::*;

    #[test]
    fn test_shallow_merge() {
        let mut engine = LearningEngine::default();
        let mut first = Map::new();
        first.insert("theme".to_string(), json!("dark"));
        first.insert("font".to_string(), json!({"size": 12}));
        engine.personalize("ana", first);

        let mut second = Map::new();
        second.insert("font".to_string(), json!({"family": "mono"}));
        let merged = engine.personalize("ana", second);

        assert_eq!(merged.preferences["theme"], "dark");
        assert_eq!(merged.preferences["font"], json!({"family": "mono"}));
        assert!(engine.get_personalization("bruno").is_none());
    }

    #[test]
    fn test_stats_aggregate_everything() {
        let mut engine = LearningEngine::default();
        engine.learn_from_feedback(UserFeedback::new(5, true), LearningContext::for_user("ana"));
        engine.learn_user_behavior("ana", "save", Map::new());
        engine.personalize("ana", context(&[("theme", "light")]));
        let model = engine.create_learning_model("classifier", Map::new());

        let stats = engine.get_learning_stats();
        assert_eq!(stats.total_records, 2);
        assert_eq!(stats.adaptation_strategies, 1);
        assert_eq!(stats.behavior_patterns, 1);
        assert_eq!(stats.personalized_users, 1);
        assert_eq!(stats.model_accuracy[&model.id], None);
    }
}
