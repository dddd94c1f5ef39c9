#![allow(dead_code)]

use warta_core::RawArticle;

pub fn article(title: &str, content: &str, metadata: &str) -> RawArticle {
    RawArticle {
        title: title.to_string(),
        url: format!("https://dispmd.example/berita/{}", title.to_lowercase().replace(' ', "-")),
        content: content.to_string(),
        metadata: metadata.to_string(),
    }
}

/// Seven district news items with a spread of access counts.
pub fn district_news() -> Vec<RawArticle> {
    vec![
        article("Musrenbang Desa", "Musyawarah perencanaan pembangunan desa membahas jalan desa dan irigasi", "Senin, 5 Februari 2024 | 120 kali"),
        article("Pelatihan Kader", "Pelatihan kader posyandu untuk kesehatan ibu dan anak di desa", "Selasa, 6 Februari 2024 | 45 kali"),
        article("Festival Budaya", "Festival budaya menampilkan tari dan gamelan dari seluruh kecamatan", "Rabu, 7 Februari 2024 | 300 kali"),
        article("Dana Desa", "Penyaluran dana desa tahap pertama untuk pembangunan jalan dan jembatan", "Kamis, 8 Februari 2024 | 80 kali"),
        article("Lomba Desa", "Lomba desa tingkat kabupaten menilai administrasi dan kebersihan desa", "tanpa info"),
        article("BUMDes", "Badan usaha milik desa mengelola wisata pantai dan pasar desa", "Sabtu, 10 Februari 2024 | 15 kali"),
        article("Sosialisasi Stunting", "Sosialisasi pencegahan stunting bersama kader posyandu", "Minggu, 11 Februari 2024 | 60 kali"),
    ]
}
