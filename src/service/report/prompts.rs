//! Prompt template for the lot risk report

use crate::model::AnalysisResult;

/// Build the report prompt from the analysis bundle and the original
/// description. The template is fixed; every numeric and categorical field
/// of the result is embedded.
pub fn build_report_prompt(result: &AnalysisResult, description: &str) -> String {
    let mut context = format!(
        r#"Анализ лота #{lot_id}:
- Описание товара: {description}
- Категория: {category}
- Обнаруженные объекты: {objects}
- Сходство изображения и текста: {similarity:.2}
- Риск ИИ-генерации: {ai_flag} (вероятность: {ai_score:.2})
- Запрещённые объекты для категории: {forbidden}
- Уровень риска: {risk}

Похожие случаи из базы знаний:
"#,
        lot_id = result.lot_id,
        description = description,
        category = result.category,
        objects = result.detected_objects.join(", "),
        similarity = result.similarity_score,
        ai_flag = if result.ai_detection.is_ai_generated {
            "Да"
        } else {
            "Нет"
        },
        ai_score = result.ai_detection.ai_score,
        forbidden = if result.has_forbidden {
            "обнаружены"
        } else {
            "не обнаружены"
        },
        risk = result.risk_level.as_str().to_uppercase(),
    );

    if result.rag_context.is_empty() {
        context.push_str("Похожих случаев не найдено.\n");
    } else {
        for (i, case) in result.rag_context.iter().enumerate() {
            context.push_str(&format!(
                "{}. {} - Риск: {}\n",
                i + 1,
                case.description,
                case.risk_level
            ));
        }
    }

    format!(
        r#"Ты — эксперт по анализу мошенничества на маркетплейсах. На основе следующих данных сформируй структурированный отчет для покупателя:

{context}

Отчет должен содержать:
1. Краткое заключение (1-2 предложения)
2. Конкретные признаки риска (если есть)
3. Рекомендации покупателю
4. Ссылки на похожие случаи (если применимо)

Пиши на русском языке, используй формальный стиль, но понятный для обычного пользователя.
"#,
        context = context
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AiDetection, RiskLevel, SimilarCase};

    fn sample_result() -> AnalysisResult {
        AnalysisResult {
            lot_id: "lot-42".to_string(),
            detected_objects: vec!["chair".to_string(), "person".to_string()],
            boxes: vec![],
            similarity_score: 0.123,
            ai_detection: AiDetection {
                is_ai_generated: true,
                ai_score: 0.9,
                explanation: String::new(),
            },
            risk_level: RiskLevel::High,
            rag_context: vec![SimilarCase {
                description: "Описание: стол. Объекты: table".to_string(),
                risk_level: RiskLevel::Medium,
                recommendation: "Проверьте историю продавца".to_string(),
            }],
            category: "мебель".to_string(),
            has_forbidden: true,
            forbidden_objects: vec!["person".to_string()],
        }
    }

    #[test]
    fn prompt_embeds_all_analysis_fields() {
        let prompt = build_report_prompt(&sample_result(), "офисный стул");

        assert!(prompt.contains("lot-42"));
        assert!(prompt.contains("офисный стул"));
        assert!(prompt.contains("мебель"));
        assert!(prompt.contains("chair, person"));
        assert!(prompt.contains("0.12"));
        assert!(prompt.contains("Да"));
        assert!(prompt.contains("0.90"));
        assert!(prompt.contains("ВЫСОКИЙ"));
        assert!(prompt.contains("1. Описание: стол"));
    }

    #[test]
    fn prompt_notes_when_no_similar_cases_exist() {
        let mut result = sample_result();
        result.rag_context.clear();
        let prompt = build_report_prompt(&result, "офисный стул");
        assert!(prompt.contains("Похожих случаев не найдено."));
    }
}
