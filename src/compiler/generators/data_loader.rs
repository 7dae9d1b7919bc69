//! DataLoader: image folder dataset plus batching loader.
//!
//! Options (defaults): `datasetPath` (`/path/to/dataset`), `batchSize` (32),
//! `shuffle` (true). Upstream inputs are ignored.

use super::{GeneratedCode, GeneratorInput, NodeGenerator};
use crate::compiler::error::CompileResult;
use crate::compiler::imports::ImportDirective;
use crate::compiler::literal;

pub const DEFAULT_DATASET_PATH: &str = "/path/to/dataset";
pub const DEFAULT_BATCH_SIZE: i64 = 32;
pub const DEFAULT_SHUFFLE: bool = true;

#[derive(Debug, Default, Clone, Copy)]
pub struct DataLoaderGenerator;

impl DataLoaderGenerator {
    pub fn imports() -> Vec<ImportDirective> {
        vec![
            ImportDirective::aliased("torchvision.transforms", "transforms"),
            ImportDirective::member("torchvision.datasets", "ImageFolder"),
            ImportDirective::member("torch.utils.data", "DataLoader"),
        ]
    }
}

impl NodeGenerator for DataLoaderGenerator {
    fn name(&self) -> &str {
        "DataLoader"
    }

    fn generate(&self, input: &GeneratorInput<'_>) -> CompileResult<GeneratedCode> {
        let config = input.config;
        let dataset_path = config.str_or("datasetPath", DEFAULT_DATASET_PATH);
        let batch_size = config.int_or("batchSize", DEFAULT_BATCH_SIZE);
        let shuffle = config.bool_or("shuffle", DEFAULT_SHUFFLE);

        if !input.inputs.is_empty() {
            tracing::debug!(
                "DataLoader {} ignores {} upstream input(s)",
                input.node_id,
                input.inputs.len()
            );
        }

        let mut w = input.writer();
        w.line(format!("# Node: DataLoader {}", input.identifier));
        w.line(format!("dataset_path = {}", literal::string(dataset_path)));
        w.line(format!("batch_size = {}", literal::integer(batch_size)));
        w.line(format!("shuffle = {}", literal::boolean(shuffle)));
        w.block("base_transform = transforms.Compose([", |w| {
            w.line("transforms.Resize((224, 224)),");
            w.line("transforms.ToTensor()");
        });
        w.line("])");
        w.line("temp_dataset = ImageFolder(root=dataset_path, transform=base_transform)");
        w.line(format!(
            "{} = DataLoader(temp_dataset, batch_size=batch_size, shuffle=shuffle)",
            input.identifier
        ));
        w.blank();

        Ok(GeneratedCode::new(w.finish(), Self::imports()))
    }
}
