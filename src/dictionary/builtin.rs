//! 内置词典：导航、首页卡片、按钮与页脚

/// (键, 繁體, 简体, English, Français)
pub const ENTRIES: &[(&str, &str, &str, &str, &str)] = &[
    ("nav.home", "首頁", "首页", "Home", "Accueil"),
    ("nav.about", "關於我們", "关于我们", "About", "À propos"),
    ("nav.worship", "崇拜聚會", "崇拜聚会", "Worship", "Culte"),
    ("nav.equipping", "裝備訓練", "装备训练", "Equipping", "Équipement"),
    ("nav.groups", "團契小組", "团契小组", "Groups", "Groupes"),
    ("nav.mission", "事工與宣教", "事工与宣教", "Mission", "Mission"),
    ("nav.contact", "聯絡我們", "联络我们", "Contact", "Contact"),
    ("card.worship", "崇拜聚會", "崇拜聚会", "Worship Service", "Service de Culte"),
    ("card.community", "信仰家庭", "信仰家庭", "Faith Family", "Famille de Foi"),
    ("card.equip", "裝備門徒", "装备门徒", "Equip Disciples", "Équiper les Disciples"),
    ("card.mission", "擴展宣教", "扩展宣教", "Expand Mission", "Étendre la Mission"),
    ("card.future", "未來聖所", "未来圣所", "Future Sanctuary", "Sanctuaire Futur"),
    ("button.more", "了解更多", "了解更多", "Learn More", "En savoir plus"),
    (
        "footer.copyright",
        "© 2024 多倫多生命河靈糧堂 版權所有",
        "© 2024 多伦多生命河灵粮堂 版权所有",
        "© 2024 Toronto LifeRiver Church. All rights reserved.",
        "© 2024 Église LifeRiver de Toronto. Tous droits réservés.",
    ),
];
