//! 宏共享的小工具

use proc_macro2::Span;
use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Error, FnArg, Ident, Pat, Result, Signature};

/// CamelCase → snake_case
pub fn snake_case(ident: &str) -> String {
    let mut out = String::with_capacity(ident.len() + 4);
    for (i, ch) in ident.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// 校验并规范化一个能力方法的签名
///
/// 要求：`&self` 接收者、非 async、非泛型、非可变参。
/// 形参模式统一改写成普通标识符，返回新签名与转发实参表。
pub fn normalized_signature(sig: &Signature) -> Result<(Signature, Vec<Ident>)> {
    if sig.asyncness.is_some() {
        return Err(Error::new_spanned(sig, "#[layered] methods cannot be async"));
    }
    if sig.constness.is_some() || sig.unsafety.is_some() || sig.abi.is_some() {
        return Err(Error::new_spanned(
            sig,
            "#[layered] methods must be plain `fn` items",
        ));
    }
    if !sig.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &sig.generics,
            "#[layered] methods cannot be generic",
        ));
    }
    if sig.variadic.is_some() {
        return Err(Error::new_spanned(
            sig,
            "#[layered] methods cannot be variadic",
        ));
    }

    let Some(FnArg::Receiver(receiver)) = sig.inputs.first() else {
        return Err(Error::new_spanned(sig, "#[layered] methods must take `&self`"));
    };
    if receiver.reference.is_none() || receiver.mutability.is_some() {
        return Err(Error::new_spanned(
            receiver,
            "#[layered] methods must take `&self`",
        ));
    }

    let mut inputs: Punctuated<FnArg, Comma> = Punctuated::new();
    inputs.push(syn::parse_quote!(&self));

    let mut args = Vec::new();
    for (position, arg) in sig.inputs.iter().skip(1).enumerate() {
        let FnArg::Typed(pat_type) = arg else {
            return Err(Error::new_spanned(arg, "unexpected extra receiver"));
        };
        let ident = match pat_type.pat.as_ref() {
            Pat::Ident(pat) if pat.subpat.is_none() => pat.ident.clone(),
            _ => Ident::new(&format!("__arg{position}"), Span::call_site()),
        };
        let ty = &pat_type.ty;
        inputs.push(syn::parse_quote!(#ident: #ty));
        args.push(ident);
    }

    let mut normalized = sig.clone();
    normalized.inputs = inputs;
    Ok((normalized, args))
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::TraitItemFn;

    fn sig_of(method: TraitItemFn) -> Signature {
        method.sig
    }

    #[test]
    fn snake_case_splits_camel_humps() {
        assert_eq!(snake_case("Note"), "note");
        assert_eq!(snake_case("AuditTrail"), "audit_trail");
        assert_eq!(snake_case("HTTP"), "h_t_t_p");
    }

    #[test]
    fn plain_method_normalizes_to_itself() {
        let sig = sig_of(syn::parse_quote! {
            fn body(&self, times: usize) -> String;
        });
        let (normalized, args) = normalized_signature(&sig).unwrap();
        assert_eq!(normalized.inputs.len(), 2);
        assert_eq!(args.len(), 1);
        assert_eq!(args[0].to_string(), "times");
    }

    #[test]
    fn wildcard_patterns_get_synthetic_names() {
        let sig = sig_of(syn::parse_quote! {
            fn feed(&self, _: usize, (a, b): (u8, u8));
        });
        let (_, args) = normalized_signature(&sig).unwrap();
        assert_eq!(args[0].to_string(), "__arg0");
        assert_eq!(args[1].to_string(), "__arg1");
    }

    #[test]
    fn owned_receiver_is_rejected() {
        let sig = sig_of(syn::parse_quote! {
            fn consume(self);
        });
        assert!(normalized_signature(&sig).is_err());
    }

    #[test]
    fn mutable_receiver_is_rejected() {
        let sig = sig_of(syn::parse_quote! {
            fn mutate(&mut self);
        });
        assert!(normalized_signature(&sig).is_err());
    }

    #[test]
    fn async_and_generic_methods_are_rejected() {
        let sig = sig_of(syn::parse_quote! {
            async fn later(&self);
        });
        assert!(normalized_signature(&sig).is_err());

        let sig = sig_of(syn::parse_quote! {
            fn generic<T>(&self, value: T);
        });
        assert!(normalized_signature(&sig).is_err());
    }
}
