//! 内置简繁单字对照表
//!
//! 两个方向都由同一张 (简, 繁) 对照表推导，因此表内字符的往返转换恒等。

use std::collections::HashMap;
use std::sync::OnceLock;

use super::ConversionMode;

/// (简体, 繁体) 单字对照
pub const CHARACTER_PAIRS: &[(char, char)] = &[
    ('义', '義'),
    ('见', '見'),
    ('爱', '愛'),
    ('乐', '樂'),
    ('欢', '歡'),
    ('庆', '慶'),
    ('祷', '禱'),
    ('经', '經'),
    ('训', '訓'),
    ('话', '話'),
    ('说', '說'),
    ('讲', '講'),
    ('识', '識'),
    ('让', '讓'),
    ('认', '認'),
    ('这', '這'),
    ('个', '個'),
    ('们', '們'),
    ('为', '為'),
    ('时', '時'),
    ('会', '會'),
    ('来', '來'),
    ('过', '過'),
    ('发', '發'),
    ('与', '與'),
    ('圣', '聖'),
    ('灵', '靈'),
    ('粮', '糧'),
    ('团', '團'),
    ('装', '裝'),
    ('备', '備'),
    ('练', '練'),
    ('门', '門'),
    ('扩', '擴'),
    ('联', '聯'),
    ('络', '絡'),
    ('关', '關'),
    ('伦', '倫'),
    ('页', '頁'),
    ('务', '務'),
    ('权', '權'),
    ('华', '華'),
    ('国', '國'),
    ('语', '語'),
    ('简', '簡'),
    ('体', '體'),
    ('礼', '禮'),
    ('众', '眾'),
    ('怀', '懷'),
    ('节', '節'),
    ('读', '讀'),
    ('书', '書'),
    ('学', '學'),
    ('习', '習'),
    ('问', '問'),
    ('题', '題'),
    ('动', '動'),
    ('难', '難'),
    ('从', '從'),
    ('无', '無'),
    ('处', '處'),
    ('长', '長'),
    ('东', '東'),
    ('观', '觀'),
    ('视', '視'),
    ('频', '頻'),
    ('带', '帶'),
    ('领', '領'),
    ('导', '導'),
    ('儿', '兒'),
    ('妇', '婦'),
    ('亲', '親'),
    ('传', '傳'),
    ('录', '錄'),
    ('师', '師'),
    ('电', '電'),
    ('邮', '郵'),
    ('约', '約'),
    ('应', '應'),
    ('许', '許'),
    ('赐', '賜'),
    ('荣', '榮'),
    ('归', '歸'),
    ('颂', '頌'),
    ('赞', '贊'),
    ('听', '聽'),
    ('实', '實'),
    ('验', '驗'),
];

struct Tables {
    s2t: HashMap<char, char>,
    t2s: HashMap<char, char>,
}

fn tables() -> &'static Tables {
    static TABLES: OnceLock<Tables> = OnceLock::new();
    TABLES.get_or_init(|| {
        let mut s2t = HashMap::with_capacity(CHARACTER_PAIRS.len());
        let mut t2s = HashMap::with_capacity(CHARACTER_PAIRS.len());
        for &(simplified, traditional) in CHARACTER_PAIRS {
            s2t.insert(simplified, traditional);
            t2s.insert(traditional, simplified);
        }
        Tables { s2t, t2s }
    })
}

/// 查询单个字符在指定方向上的对应字符
pub fn lookup(ch: char, mode: ConversionMode) -> Option<char> {
    let tables = tables();
    match mode {
        ConversionMode::SimplifiedToTraditional => tables.s2t.get(&ch).copied(),
        ConversionMode::TraditionalToSimplified => tables.t2s.get(&ch).copied(),
    }
}

/// 单字替换，表外字符原样保留
pub fn convert_chars(text: &str, mode: ConversionMode) -> String {
    text.chars()
        .map(|ch| lookup(ch, mode).unwrap_or(ch))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_table_is_bijective() {
        let tables = tables();
        assert_eq!(tables.s2t.len(), tables.t2s.len());
        for (simplified, traditional) in &tables.s2t {
            assert_eq!(tables.t2s.get(traditional), Some(simplified));
        }
    }

    #[test]
    fn test_no_character_on_both_sides() {
        let tables = tables();
        let simplified: HashSet<_> = tables.s2t.keys().collect();
        let traditional: HashSet<_> = tables.t2s.keys().collect();
        assert!(simplified.is_disjoint(&traditional));
    }

    #[test]
    fn test_convert_chars_passthrough() {
        assert_eq!(
            convert_chars("这是ABC", ConversionMode::SimplifiedToTraditional),
            "這是ABC"
        );
        assert_eq!(
            convert_chars("聖經", ConversionMode::TraditionalToSimplified),
            "圣经"
        );
    }
}
