use std::sync::Arc;

use once_cell::sync::Lazy;
use veneer_core::prelude::*;
use veneer_core::{CatalogEntry, Terminal};
use veneer_macros::layered;

// ==================== 能力定义 ====================

/// 文章能力——被拦截的操作面
#[layered]
pub trait Article: Send + Sync + 'static {
    fn render(&self, width: usize) -> String;
    fn summary(&self) -> String;
}

// ==================== 被装饰类型 ====================

/// 博客文章，真实实现
struct BlogPost {
    title: String,
    body: String,
}

impl Article for BlogPost {
    fn render(&self, width: usize) -> String {
        let mut text = format!("{}\n{}", self.title, self.body);
        text.truncate(width);
        text
    }

    fn summary(&self) -> String {
        self.body.chars().take(16).collect()
    }
}

static BLOG_POST_FACTS: Lazy<TypeFacts> = Lazy::new(|| {
    TypeFacts::of("BlogPost")
        .implements("Renderable")
        .uses("Timestamped")
});

impl Stackable for BlogPost {
    type Surface = dyn ArticleLayer;

    fn facts() -> &'static TypeFacts {
        &BLOG_POST_FACTS
    }

    fn terminal(target: Arc<Self>) -> Box<dyn ArticleLayer> {
        Box::new(Terminal::new(target))
    }
}

// ==================== 层实现 ====================

/// 审计层：记录每次渲染的进出
#[derive(Default)]
struct AuditLayer {
    next: NextSlot<dyn ArticleLayer>,
}

impl ArticleLayer for AuditLayer {
    link_methods!(dyn ArticleLayer, next);

    fn render(&self, width: usize) -> String {
        tracing::info!(width, "→ render");
        let output = self.next_link().render(width);
        tracing::info!(chars = output.len(), "← render");
        output
    }
}

// 审计层按名称进目录，注册时写 "audit" 即可
inventory::submit! {
    ArticleLayerEntry(CatalogEntry {
        name: "audit",
        create: || Box::new(AuditLayer::default()) as Box<dyn ArticleLayer>,
    })
}

/// 大写层：渲染结果整体转大写
#[derive(Default)]
struct ShoutLayer {
    next: NextSlot<dyn ArticleLayer>,
}

impl ArticleLayer for ShoutLayer {
    link_methods!(dyn ArticleLayer, next);

    fn render(&self, width: usize) -> String {
        self.next_link().render(width).to_uppercase()
    }
}

/// 遮蔽层：把敏感词替换成占位符；原型注册，每条链一份独立副本
struct RedactLayer {
    next: NextSlot<dyn ArticleLayer>,
    banned: Vec<&'static str>,
}

impl RedactLayer {
    fn new(banned: Vec<&'static str>) -> Self {
        Self {
            next: NextSlot::unbound(),
            banned,
        }
    }
}

impl Clone for RedactLayer {
    fn clone(&self) -> Self {
        // 副本从未绑定状态开始，装配时各自接上自己的下一环
        Self::new(self.banned.clone())
    }
}

impl ArticleLayer for RedactLayer {
    link_methods!(dyn ArticleLayer, next);

    fn render(&self, width: usize) -> String {
        let mut output = self.next_link().render(width);
        for word in &self.banned {
            output = output.replace(word, "█████");
        }
        output
    }

    fn summary(&self) -> String {
        let mut output = self.next_link().summary();
        for word in &self.banned {
            output = output.replace(word, "█████");
        }
        output
    }
}

// ==================== 引导 ====================

fn main() -> anyhow::Result<()> {
    LoggingConfig::from_env().init()?;

    let registry: Arc<LayerRegistry<dyn ArticleLayer>> = Arc::new(LayerRegistry::new());
    registry.declare_target(&BLOG_POST_FACTS);
    load_article_layers(&registry);

    // 审计层优先级最高，贴近终端，最先看到真实输出
    registry.add_with_priority("audit", "implements:Renderable", 10)?;
    registry.add(
        LayerSpec::factory(|| Ok(Box::new(ShoutLayer::default()) as Box<dyn ArticleLayer>)),
        "class:BlogPost",
    )?;
    registry.add(
        LayerSpec::prototype(RedactLayer::new(vec!["SECRET"]), |t| {
            Box::new(t.clone()) as Box<dyn ArticleLayer>
        }),
        "uses:Timestamped",
    )?;

    let post = Stacked::new(
        BlogPost {
            title: "veneer in practice".to_string(),
            body: "layers over a SECRET base".to_string(),
        },
        registry,
    );

    println!("render : {}", post.render(64));
    println!("summary: {}", post.summary());
    println!("raw    : {}", post.inner().render(64));

    Ok(())
}
