use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use edustats::model::ExtractedTable;
use edustats::services::{ExtractError, Extractor};

pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Gemini client that coerces raw sheet text into the normalized
/// subjects + students table.
///
/// The prompt carries the Portuguese grading conventions so qualitative
/// labels come back as numbers ("Adquirido" → 3, "Muito Bom" → 5) and
/// blank or unknown cells as 0.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key,
            model,
        }
    }

    fn prompt(raw_text: &str) -> String {
        format!(
            r#"Analise o seguinte texto bruto de uma Google Sheet e extraia os dados estruturados.

ESTRUTURA DA FOLHA:
1. A LINHA 1 contém os cabeçalhos.
2. Coluna A (1ª): Nº do aluno.
3. Coluna B (2ª): Nome do Aluno.
4. Coluna C (3ª) em diante: Nomes das DISCIPLINAS.

CONVERSÃO DE NOTAS (MUITO IMPORTANTE):
Converta avaliações qualitativas para números para permitir cálculos:

PRÉ-ESCOLAR:
- "Adquirido" ou "Adquirida" -> 3
- "Em Aquisição" -> 2
- "Não Adquirido" ou "Não Adquirida" -> 1

1.º CICLO:
- "Muito Bom" -> 5
- "Bom" -> 4
- "Suficiente" -> 3
- "Insuficiente" -> 2
- "Não Satisfaz" -> 2
- "Satisfaz" -> 3

NOTAS NUMÉRICAS:
- Para escalas 1-5 ou 1-20, mantenha o valor original.
- Se o campo estiver vazio, "S/C" ou não-numérico/desconhecido, use 0.

TAREFA:
1. Identifique todas as disciplinas presentes na primeira linha a partir da coluna C.
2. Para cada linha subsequente, extraia o número, o nome e as notas correspondentes.
3. Ignore linhas de rodapé ou vazias.

Retorne um objeto JSON com:
- "subjects": Array com os nomes das disciplinas.
- "students": Array de objetos com "numero", "aluno" e "scores" (array de números na mesma ordem das "subjects").

Texto bruto:
{raw_text}"#
        )
    }

    fn response_schema() -> serde_json::Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "subjects": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" }
                },
                "students": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "numero": { "type": "INTEGER" },
                            "aluno": { "type": "STRING" },
                            "scores": {
                                "type": "ARRAY",
                                "items": { "type": "NUMBER" }
                            }
                        },
                        "required": ["numero", "aluno", "scores"]
                    }
                }
            },
            "required": ["subjects", "students"]
        })
    }
}

#[async_trait]
impl Extractor for GeminiClient {
    async fn extract(&self, raw_text: &str) -> Result<ExtractedTable, ExtractError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "contents": [{ "parts": [{ "text": Self::prompt(raw_text) }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": Self::response_schema()
            }
        });

        // Extraction over a full sheet can take a while.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ExtractError::Service(e.to_string()))?;

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ExtractError::Service(format!("request failed: {e}")))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ExtractError::RateLimited);
        }
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Service(format!("status {status}: {body}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ExtractError::Service(format!("invalid response body: {e}")))?;

        let text = json["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                ExtractError::Service("response carries no extraction text".to_string())
            })?;

        debug!(bytes = text.len(), "Extraction text received");

        let table: ExtractedTable = serde_json::from_str(text)
            .map_err(|e| ExtractError::Service(format!("extraction text is not valid JSON: {e}")))?;

        Ok(table)
    }
}
