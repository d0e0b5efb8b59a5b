//! Prompt construction for page generation and refinement

use crate::request::{GenerationRequest, RefinementRequest};

pub const DEFAULT_INDUSTRY: &str = "科技";
pub const DEFAULT_PAGE_TYPE: &str = "落地";
pub const DEFAULT_STYLE: &str = "现代";
pub const DEFAULT_COLOR_SCHEME: &str = "#2563eb,#1e40af";

/// Navigation, hero, features, testimonials, contact
pub const PAGE_SECTIONS: [&str; 5] = [
  "导航栏"
, "英雄区(主视觉)"
, "产品功能"
, "客户评价"
, "联系方式"
];

pub fn build_generation_prompt(req: &GenerationRequest) -> String
{   let industry = req.industry.as_deref()
      .unwrap_or(DEFAULT_INDUSTRY);
    let page_type = req.page_type.as_deref()
      .unwrap_or(DEFAULT_PAGE_TYPE);
    let style = req.style.as_deref()
      .unwrap_or(DEFAULT_STYLE);
    let color_scheme = req.color_scheme.as_deref()
      .unwrap_or(DEFAULT_COLOR_SCHEME);

    format!(
"生成一个{industry}行业的{page_type}页面，要求:
- 主要卖点: {features}
- 风格: {style}
- 配色: {color_scheme}
- 包含以下区块: {sections}
- 使用现代、响应式设计
- 生成完整HTML代码，包含内联CSS和移动端适配
"
      , features = req.key_features.join(", ")
      , sections = PAGE_SECTIONS.join("、")
    )
}

/// The original HTML is embedded verbatim
pub fn build_refinement_prompt(req: &RefinementRequest) -> String
{   format!(
"请根据以下要求优化网页内容:
原始HTML:
{original_html}

优化要求:
{instructions}

请保持原有的HTML结构，只修改需要优化的部分。
"
      , original_html = req.original_html
      , instructions = req.instructions
    )
}
