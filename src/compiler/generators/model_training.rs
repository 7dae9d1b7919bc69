//! ModelTraining: builds a torchvision model and trains it on the upstream
//! loader.
//!
//! Options (defaults): `modelType` (`resnet50`), `learningRate` (0.001),
//! `epochs` (10), `optimizerConfig.type` (`adam`), `optimizerConfig.beta1`
//! (0.9), `optimizerConfig.beta2` (0.999), `optimizerConfig.momentum` (0.9).
//!
//! Model and optimizer selection are emitted as `if`/`elif` chains ending in a
//! `raise ValueError`, so an unknown name fails when the generated script runs.
//! With `strict_models` set the names are checked here instead and an unknown
//! one is an `UnsupportedConfiguration` error.
//!
//! The training loop moves tensors to `device`. When the entry routine does
//! not bind it, the block binds it itself.

use super::{CodeWriter, GeneratedCode, GeneratorInput, NodeGenerator};
use crate::compiler::assembler::DEVICE_SETUP;
use crate::compiler::error::{CompileError, CompileResult};
use crate::compiler::imports::ImportDirective;
use crate::compiler::literal;

pub const DEFAULT_MODEL: &str = "resnet50";
pub const DEFAULT_LEARNING_RATE: f64 = 0.001;
pub const DEFAULT_EPOCHS: i64 = 10;
pub const DEFAULT_OPTIMIZER: &str = "adam";
pub const DEFAULT_BETA1: f64 = 0.9;
pub const DEFAULT_BETA2: f64 = 0.999;
pub const DEFAULT_MOMENTUM: f64 = 0.9;

/// torchvision architectures the generated script can construct.
pub const SUPPORTED_MODELS: &[&str] = &["resnet18", "resnet50", "vgg16", "mobilenet_v2"];

/// Optimizers and the constructor call emitted for each.
const OPTIMIZERS: &[(&str, &str)] = &[
    (
        "adam",
        "optim.Adam(temp_model.parameters(), lr=learning_rate, betas=(beta1, beta2))",
    ),
    (
        "adamw",
        "optim.AdamW(temp_model.parameters(), lr=learning_rate, betas=(beta1, beta2))",
    ),
    (
        "sgd",
        "optim.SGD(temp_model.parameters(), lr=learning_rate, momentum=momentum)",
    ),
];

#[derive(Debug, Default, Clone, Copy)]
pub struct ModelTrainingGenerator;

impl ModelTrainingGenerator {
    pub fn imports() -> Vec<ImportDirective> {
        vec![
            ImportDirective::module("torch"),
            ImportDirective::aliased("torch.nn", "nn"),
            ImportDirective::aliased("torch.optim", "optim"),
            ImportDirective::module("torchvision"),
        ]
    }

    pub fn supported_optimizers() -> impl Iterator<Item = &'static str> {
        OPTIMIZERS.iter().map(|(name, _)| *name)
    }

    fn check_supported(
        input: &GeneratorInput<'_>,
        key: &str,
        value: &str,
        mut supported: impl Iterator<Item = &'static str>,
    ) -> CompileResult<()> {
        if !input.options.strict_models || supported.any(|s| s == value) {
            return Ok(());
        }
        Err(CompileError::UnsupportedConfiguration {
            node: input.node_id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    fn write_model(w: &mut CodeWriter) {
        for (i, model) in SUPPORTED_MODELS.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elif" };
            w.block(
                format!("{} model_type.lower() == {}:", keyword, literal::string(model)),
                |w| {
                    w.line(format!("temp_model = torchvision.models.{}(weights=None)", model));
                },
            );
        }
        w.block("else:", |w| {
            w.line("raise ValueError(f'Unsupported model: {model_type}')");
        });
    }

    fn write_optimizer(w: &mut CodeWriter) {
        for (i, (name, constructor)) in OPTIMIZERS.iter().enumerate() {
            let keyword = if i == 0 { "if" } else { "elif" };
            w.block(
                format!("{} optimizer_type == {}:", keyword, literal::string(name)),
                |w| {
                    w.line(format!("temp_optimizer = {}", constructor));
                },
            );
        }
        w.block("else:", |w| {
            w.line("raise ValueError(f'Unsupported optimizer type: {optimizer_type}')");
        });
    }

    fn write_training_loop(w: &mut CodeWriter, loader: &str, bind_device: bool) {
        if bind_device {
            w.line(DEVICE_SETUP);
        }
        w.line("temp_model.to(device)");
        w.line("print(f'Starting training for {epochs} epochs...')");
        w.block("for epoch in range(epochs):", |w| {
            w.line("temp_model.train()");
            w.line("running_loss = 0.0");
            w.block(format!("for datapoint, labels in {}:", loader), |w| {
                w.line("datapoint, labels = datapoint.to(device), labels.to(device)");
                w.line("temp_optimizer.zero_grad()");
                w.line("outputs = temp_model(datapoint)");
                w.line("loss = criterion(outputs, labels)");
                w.line("loss.backward()");
                w.line("temp_optimizer.step()");
                w.line("running_loss += loss.item()");
            });
            w.line(format!("avg_loss = running_loss / len({})", loader));
            w.line("print(f'Epoch [{epoch+1}/{epochs}], Loss: {avg_loss:.4f}')");
        });
    }
}

impl NodeGenerator for ModelTrainingGenerator {
    fn name(&self) -> &str {
        "ModelTraining"
    }

    fn generate(&self, input: &GeneratorInput<'_>) -> CompileResult<GeneratedCode> {
        let config = input.config;
        let model_type = config.str_or("modelType", DEFAULT_MODEL);
        let learning_rate = config.float_or("learningRate", DEFAULT_LEARNING_RATE);
        let epochs = config.int_or("epochs", DEFAULT_EPOCHS);

        let optimizer = config.section("optimizerConfig");
        let optimizer_type = optimizer.str_or("type", DEFAULT_OPTIMIZER).to_lowercase();
        let beta1 = optimizer.float_or("beta1", DEFAULT_BETA1);
        let beta2 = optimizer.float_or("beta2", DEFAULT_BETA2);
        let momentum = optimizer.float_or("momentum", DEFAULT_MOMENTUM);

        Self::check_supported(
            input,
            "modelType",
            &model_type.to_lowercase(),
            SUPPORTED_MODELS.iter().copied(),
        )?;
        Self::check_supported(
            input,
            "optimizerConfig.type",
            &optimizer_type,
            Self::supported_optimizers(),
        )?;

        let loader = input.primary_input();

        let mut w = input.writer();
        w.line(format!("# Node: ModelTraining {}", input.identifier));
        w.line(format!("model_type = {}", literal::string(model_type)));
        Self::write_model(&mut w);
        w.blank();
        w.line("criterion = nn.CrossEntropyLoss()");
        w.line(format!("learning_rate = {}", literal::float(learning_rate)));
        w.line(format!("epochs = {}", literal::integer(epochs)));
        w.blank();
        w.line(format!("optimizer_type = {}", literal::string(&optimizer_type)));
        w.line(format!("beta1 = {}", literal::float(beta1)));
        w.line(format!("beta2 = {}", literal::float(beta2)));
        w.line(format!("momentum = {}", literal::float(momentum)));
        w.blank();
        Self::write_optimizer(&mut w);
        w.blank();
        Self::write_training_loop(&mut w, loader, !input.options.device_setup);
        w.blank();
        w.line("print('Training complete!')");
        w.line(format!("{} = temp_model", input.identifier));
        w.blank();

        Ok(GeneratedCode::new(w.finish(), Self::imports()))
    }
}
