#![no_main]

use invgrid_gui::{Item, Marker, NormalGui, PagedItemsGui, ScrollItemsGui, Structure};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 1024 {
        return;
    }
    let rows: Vec<&str> = text.lines().collect();
    let Ok(structure) = Structure::new(&rows[..]) else {
        return;
    };
    let structure = structure
        .ingredient('#', Item::new("border"))
        .ingredient('x', Marker::ContentListHorizontal)
        .ingredient('y', Marker::ContentListVertical);

    let gui = NormalGui::new(&structure);
    assert_eq!(gui.size(), structure.size());

    let content: Vec<Item> = (0..structure.size() * 2).map(|i| Item::new(i.to_string())).collect();
    if let Ok(paged) = PagedItemsGui::with_content(&structure, content.clone()) {
        let _ = paged.set_page(usize::MAX);
        assert!(paged.page() < paged.page_count().max(1));
    }
    if let Ok(scroll) = ScrollItemsGui::with_content(&structure, content) {
        let _ = scroll.set_line(usize::MAX);
        assert!(scroll.line() <= scroll.max_line());
    }
});
