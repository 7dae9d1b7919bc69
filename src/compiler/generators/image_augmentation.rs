//! ImageAugmentation: rewraps an upstream loader with random transforms.
//!
//! Only options with a truthy/positive value contribute a transform step:
//! - `rotation` > 0 → `RandomRotation(rotation)`
//! - `flip` true → `RandomHorizontalFlip()`, a positive number → flip with
//!   that probability
//! - `brightness` > 0 → `ColorJitter(brightness=...)`
//! - `crop` as `[size, scale]` or `{size, scale}` → `RandomResizedCrop`
//!
//! The resize/tensor steps are always appended. The new loader keeps the
//! upstream loader's batch size and shuffling.

use super::{GeneratedCode, GeneratorInput, NodeGenerator};
use crate::compiler::error::CompileResult;
use crate::compiler::imports::ImportDirective;
use crate::compiler::literal;
use crate::pipeline::node::NodeConfig;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageAugmentationGenerator;

impl ImageAugmentationGenerator {
    pub fn imports() -> Vec<ImportDirective> {
        vec![
            ImportDirective::module("torch"),
            ImportDirective::aliased("torchvision.transforms", "transforms"),
            ImportDirective::member("torch.utils.data", "DataLoader"),
        ]
    }

    /// Transform steps selected by the configuration, in fixed order.
    fn steps(config: &NodeConfig) -> Vec<String> {
        let mut steps = Vec::new();

        if let Some(rotation) = config.positive_number("rotation") {
            steps.push(format!("transforms.RandomRotation({})", literal::number(&rotation)));
        }

        match config.get("flip") {
            Some(Value::Bool(true)) => steps.push("transforms.RandomHorizontalFlip()".to_string()),
            Some(Value::Number(_)) => {
                if let Some(p) = config.positive_number("flip") {
                    steps.push(format!(
                        "transforms.RandomHorizontalFlip(p={})",
                        literal::number(&p)
                    ));
                }
            }
            _ => {}
        }

        if let Some(brightness) = config.positive_number("brightness") {
            steps.push(format!(
                "transforms.ColorJitter(brightness={})",
                literal::number(&brightness)
            ));
        }

        if let Some(crop) = Self::crop(config) {
            steps.push(crop);
        }

        steps
    }

    fn crop(config: &NodeConfig) -> Option<String> {
        let (size, scale) = match config.get("crop")? {
            Value::Array(items) if !items.is_empty() => (items.first()?, items.get(1)),
            Value::Object(map) => (map.get("size")?, map.get("scale")),
            Value::Array(_) | Value::Bool(false) => return None,
            other => {
                tracing::warn!("Ignoring crop option of unexpected shape: {}", other);
                return None;
            }
        };

        let size = match size {
            Value::Array(dims) => literal::tuple(dims),
            other => literal::value(other),
        };
        Some(match scale {
            Some(Value::Array(range)) => format!(
                "transforms.RandomResizedCrop(size={}, scale={})",
                size,
                literal::tuple(range)
            ),
            Some(Value::Null) | None => format!("transforms.RandomResizedCrop(size={})", size),
            Some(other) => format!(
                "transforms.RandomResizedCrop(size={}, scale={})",
                size,
                literal::value(other)
            ),
        })
    }
}

impl NodeGenerator for ImageAugmentationGenerator {
    fn name(&self) -> &str {
        "ImageAugmentation"
    }

    fn generate(&self, input: &GeneratorInput<'_>) -> CompileResult<GeneratedCode> {
        let upstream = input.primary_input();
        if input.inputs.len() > 1 {
            tracing::debug!(
                "ImageAugmentation {} uses {} and ignores {} further input(s)",
                input.node_id,
                upstream,
                input.inputs.len() - 1
            );
        }

        let mut w = input.writer();
        w.line(format!("# Node: ImageAugmentation {}", input.identifier));
        w.line("aug_transforms = []");
        for step in Self::steps(input.config) {
            w.line(format!("aug_transforms.append({})", step));
        }
        w.line("aug_transforms.append(transforms.Resize((224, 224)))");
        w.line("aug_transforms.append(transforms.ToTensor())");
        w.line("augmentation_transform = transforms.Compose(aug_transforms)");
        w.blank();
        w.line("# Extract dataset from the upstream DataLoader");
        w.line(format!("upstream_dataset = {}.dataset", upstream));
        w.line("upstream_dataset.transform = augmentation_transform");
        w.blank();
        w.block(format!("{} = DataLoader(upstream_dataset,", input.identifier), |w| {
            w.line(format!("batch_size={}.batch_size,", upstream));
            w.line(format!(
                "shuffle=isinstance({}.sampler, torch.utils.data.RandomSampler))",
                upstream
            ));
        });
        w.blank();

        Ok(GeneratedCode::new(w.finish(), Self::imports()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::generators::{GeneratorOptions, MISSING_INPUT};
    use crate::pipeline::{NodeId, NodeType};
    use serde_json::json;

    fn generate(config: Value, inputs: &[&str]) -> Vec<String> {
        let id = NodeId::new("n2");
        let config = NodeConfig::from_value(config);
        let inputs: Vec<String> = inputs.iter().map(|s| s.to_string()).collect();
        let options = GeneratorOptions::default();
        ImageAugmentationGenerator
            .generate(&GeneratorInput {
                node_id: &id,
                node_type: &NodeType::ImageAugmentation,
                identifier: "imageaugmentation_n2",
                config: &config,
                inputs: &inputs,
                options: &options,
            })
            .unwrap()
            .lines
    }

    fn appended(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .filter_map(|l| l.strip_prefix("aug_transforms.append("))
            .collect()
    }

    #[test]
    fn test_rotation_and_flip() {
        let lines = generate(json!({"rotation": 15, "flip": true}), &["dataloader_n1"]);
        assert_eq!(
            appended(&lines),
            vec![
                "transforms.RandomRotation(15))",
                "transforms.RandomHorizontalFlip())",
                "transforms.Resize((224, 224)))",
                "transforms.ToTensor())",
            ]
        );
        assert!(lines.contains(&"upstream_dataset = dataloader_n1.dataset".to_string()));
        assert!(lines.contains(&"imageaugmentation_n2 = DataLoader(upstream_dataset,".to_string()));
        assert!(lines.contains(&"    batch_size=dataloader_n1.batch_size,".to_string()));
    }

    #[test]
    fn test_zero_and_false_options_are_omitted() {
        let lines = generate(
            json!({"rotation": 0, "flip": false, "brightness": 0.0, "crop": []}),
            &["up"],
        );
        assert_eq!(
            appended(&lines),
            vec!["transforms.Resize((224, 224)))", "transforms.ToTensor())"]
        );
    }

    #[test]
    fn test_brightness_flip_probability_and_crop() {
        let lines = generate(
            json!({"flip": 0.3, "brightness": 0.2, "crop": [224, [0.08, 1.0]]}),
            &["up"],
        );
        assert_eq!(
            appended(&lines)[..3],
            [
                "transforms.RandomHorizontalFlip(p=0.3))",
                "transforms.ColorJitter(brightness=0.2))",
                "transforms.RandomResizedCrop(size=224, scale=(0.08, 1.0)))",
            ]
        );
    }

    #[test]
    fn test_crop_mapping_without_scale() {
        let lines = generate(json!({"crop": {"size": [200, 100]}}), &["up"]);
        assert_eq!(
            appended(&lines)[0],
            "transforms.RandomResizedCrop(size=(200, 100)))"
        );
    }

    #[test]
    fn test_missing_upstream_uses_placeholder() {
        let lines = generate(json!({}), &[]);
        assert!(lines.contains(&format!("upstream_dataset = {}.dataset", MISSING_INPUT)));
    }

    #[test]
    fn test_first_input_wins() {
        let lines = generate(json!({}), &["first", "second"]);
        assert!(lines.contains(&"upstream_dataset = first.dataset".to_string()));
        assert!(!lines.iter().any(|l| l.contains("second")));
    }
}
