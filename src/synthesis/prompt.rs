// Fixed Korean prompt for description synthesis

use super::provider::SynthesisRequest;

/// Build the user prompt for a triple. The prompt and the expected answer are
/// both Korean; the locale is not configurable.
pub fn build_prompt(request: &SynthesisRequest) -> String {
    format!(
        "다음 세 요소를 창의적으로 조합하여 혁신적인 아이디어나 해결책을 한국어로 2-3문장으로 제안해주세요:\n\
         \n\
         문제: {}\n\
         키워드: {}\n\
         메타포: {}\n\
         \n\
         창의적이고 실용적인 관점에서 이 세 요소가 어떻게 연결될 수 있는지 설명해주세요.",
        request.problem.trim(),
        request.keyword.trim(),
        request.metaphor.trim(),
    )
}
