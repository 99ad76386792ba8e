//! `#[layered]` 展开实现
//!
//! 对能力 trait `Foo` 生成三件转发制品与目录装载胶水，形状与
//! veneer-core 里手写的链环契约完全一致。

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Error, ItemTrait, Result, TraitItem};

use crate::utils;

pub fn expand_layered(item: ItemTrait) -> Result<TokenStream> {
    if !item.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &item.generics,
            "#[layered] traits cannot have generic parameters",
        ));
    }

    let vis = &item.vis;
    let trait_ident = &item.ident;
    let layer_ident = format_ident!("{}Layer", trait_ident);
    let entry_ident = format_ident!("{}LayerEntry", trait_ident);
    let loader_ident = format_ident!(
        "load_{}_layers",
        utils::snake_case(&trait_ident.to_string())
    );

    let mut layer_methods = Vec::new();
    let mut terminal_methods = Vec::new();
    let mut stacked_methods = Vec::new();

    for member in &item.items {
        let TraitItem::Fn(method) = member else {
            return Err(Error::new_spanned(
                member,
                "#[layered] traits may only contain methods",
            ));
        };
        let (sig, args) = utils::normalized_signature(&method.sig)?;
        let name = &sig.ident;

        // 层 trait：默认转发给下一环
        layer_methods.push(quote! {
            #sig {
                self.next_link().#name(#(#args),*)
            }
        });
        // 终端适配器：抵达真实实现
        terminal_methods.push(quote! {
            #sig {
                self.target().#name(#(#args),*)
            }
        });
        // 被装饰对象：改道经过层栈头环
        stacked_methods.push(quote! {
            #sig {
                self.stack().#name(#(#args),*)
            }
        });
    }

    let layer_doc = format!(
        "`{trait_ident}` 能力的层 trait。\n\n\
         未覆写的操作默认把原始参数转发给下一环；具体层只覆写\n\
         自己关心的操作。"
    );
    let entry_doc = format!("`{layer_ident}` 的目录条目，供 `inventory::submit!` 收集。");
    let loader_doc = format!(
        "把经 `inventory` 收集的 `{layer_ident}` 类型灌入注册表目录。"
    );

    Ok(quote! {
        #item

        #[doc = #layer_doc]
        #vis trait #layer_ident: Send + Sync {
            /// 绑定下一环（装配期使用）
            fn bind_next(&mut self, next: ::std::boxed::Box<dyn #layer_ident>);

            /// 取下一环的引用；未绑定的非终端层会 panic
            fn next_link(&self) -> &(dyn #layer_ident + 'static);

            #(#layer_methods)*
        }

        impl veneer_core::Link<dyn #layer_ident> for dyn #layer_ident {
            fn bind_next(&mut self, next: ::std::boxed::Box<dyn #layer_ident>) {
                #layer_ident::bind_next(self, next)
            }

            fn next_link(&self) -> &(dyn #layer_ident + 'static) {
                #layer_ident::next_link(self)
            }
        }

        impl<T> #layer_ident for veneer_core::Terminal<T>
        where
            T: #trait_ident + Send + Sync + 'static,
        {
            /// 终端没有"下一环"的概念；绑定是无操作
            fn bind_next(&mut self, _next: ::std::boxed::Box<dyn #layer_ident>) {}

            fn next_link(&self) -> &(dyn #layer_ident + 'static) {
                panic!("terminal adapter has no next link; it always reaches the real implementation")
            }

            #(#terminal_methods)*
        }

        impl<T> #trait_ident for veneer_core::Stacked<T>
        where
            T: #trait_ident + veneer_core::Stackable<Surface = dyn #layer_ident>,
        {
            #(#stacked_methods)*
        }

        #[doc = #entry_doc]
        #vis struct #entry_ident(pub veneer_core::CatalogEntry<dyn #layer_ident>);

        veneer_core::inventory::collect!(#entry_ident);

        #[doc = #loader_doc]
        #vis fn #loader_ident(registry: &veneer_core::LayerRegistry<dyn #layer_ident>) {
            for entry in veneer_core::inventory::iter::<#entry_ident> {
                registry.register_layer(entry.0.name, entry.0.create);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expand(tokens: TokenStream) -> Result<TokenStream> {
        expand_layered(syn::parse2(tokens).unwrap())
    }

    #[test]
    fn expansion_contains_the_three_artifacts() {
        let output = expand(quote! {
            pub trait Note: Send + Sync + 'static {
                fn body(&self, times: usize) -> String;
            }
        })
        .unwrap()
        .to_string();

        assert!(output.contains("trait NoteLayer"));
        assert!(output.contains("Terminal"));
        assert!(output.contains("Stacked"));
        assert!(output.contains("NoteLayerEntry"));
        assert!(output.contains("load_note_layers"));
    }

    #[test]
    fn generic_trait_is_rejected() {
        let err = expand(quote! {
            trait Broken<T> {
                fn get(&self) -> T;
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("generic"));
    }

    #[test]
    fn associated_items_are_rejected() {
        let err = expand(quote! {
            trait Broken {
                const LIMIT: usize;
                fn get(&self) -> usize;
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("only contain methods"));
    }

    #[test]
    fn non_ref_receiver_is_rejected() {
        let err = expand(quote! {
            trait Broken {
                fn take(self) -> usize;
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("&self"));
    }
}
