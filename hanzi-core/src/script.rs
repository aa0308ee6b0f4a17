//! Traditional/Simplified script conversion

use crate::types::ScriptVariant;
use std::collections::HashMap;

/// Converts text into the requested orthography.
///
/// Implementations must be pure: same input, same output.
pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str, target: ScriptVariant) -> String;
}

/// (traditional, simplified) pairs for common characters.
/// Ambiguous one-to-many mappings (後/后, 髮/發, 麵/面) are left out.
const CHARACTER_PAIRS: &[(char, char)] = &[
    ('這', '这'), ('個', '个'), ('們', '们'), ('來', '来'), ('時', '时'),
    ('為', '为'), ('說', '说'), ('國', '国'), ('對', '对'), ('會', '会'),
    ('學', '学'), ('過', '过'), ('麼', '么'), ('還', '还'), ('當', '当'),
    ('發', '发'), ('與', '与'), ('經', '经'), ('現', '现'), ('開', '开'),
    ('關', '关'), ('長', '长'), ('問', '问'), ('間', '间'), ('樣', '样'),
    ('見', '见'), ('點', '点'), ('頭', '头'), ('東', '东'), ('車', '车'),
    ('門', '门'), ('馬', '马'), ('鳥', '鸟'), ('魚', '鱼'), ('龍', '龙'),
    ('風', '风'), ('飛', '飞'), ('書', '书'), ('話', '话'), ('語', '语'),
    ('讀', '读'), ('寫', '写'), ('聽', '听'), ('愛', '爱'), ('氣', '气'),
    ('電', '电'), ('腦', '脑'), ('漢', '汉'), ('體', '体'), ('號', '号'),
    ('員', '员'), ('寶', '宝'), ('貓', '猫'), ('畫', '画'), ('萬', '万'),
    ('歲', '岁'), ('葉', '叶'), ('雲', '云'), ('陽', '阳'), ('陰', '阴'),
    ('網', '网'), ('線', '线'), ('紅', '红'), ('綠', '绿'), ('藍', '蓝'),
    ('黃', '黄'), ('齒', '齿'), ('邊', '边'), ('遠', '远'), ('運', '运'),
    ('動', '动'), ('熱', '热'), ('難', '难'), ('應', '应'), ('歡', '欢'),
    ('樂', '乐'), ('親', '亲'), ('覺', '觉'), ('錢', '钱'), ('買', '买'),
    ('賣', '卖'), ('貝', '贝'), ('兒', '儿'), ('筆', '笔'), ('區', '区'),
    ('醫', '医'), ('藥', '药'), ('飯', '饭'), ('鐘', '钟'), ('灣', '湾'),
    ('憂', '忧'), ('無', '无'), ('業', '业'), ('從', '从'), ('觀', '观'),
    ('聲', '声'), ('讓', '让'), ('進', '进'), ('實', '实'), ('總', '总'),
];

/// Character-table converter; characters without a mapping pass through.
pub struct TableConverter {
    to_simplified: HashMap<char, char>,
    to_traditional: HashMap<char, char>,
}

impl TableConverter {
    pub fn new() -> Self {
        Self::with_pairs(CHARACTER_PAIRS.iter().copied())
    }

    /// Build from (traditional, simplified) pairs. The first pair wins when
    /// a character appears twice on the same side.
    pub fn with_pairs(pairs: impl IntoIterator<Item = (char, char)>) -> Self {
        let mut to_simplified = HashMap::new();
        let mut to_traditional = HashMap::new();
        for (traditional, simplified) in pairs {
            to_simplified.entry(traditional).or_insert(simplified);
            to_traditional.entry(simplified).or_insert(traditional);
        }
        Self {
            to_simplified,
            to_traditional,
        }
    }

    pub fn len(&self) -> usize {
        self.to_simplified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_simplified.is_empty()
    }
}

impl Default for TableConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptConverter for TableConverter {
    fn convert(&self, text: &str, target: ScriptVariant) -> String {
        let table = match target {
            ScriptVariant::Simplified => &self.to_simplified,
            ScriptVariant::Traditional => &self.to_traditional,
        };
        text.chars()
            .map(|c| table.get(&c).copied().unwrap_or(c))
            .collect()
    }
}
